use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("epaper")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Download e-paper newspaper issues as EPUB files")
        .arg(
            clap::arg!([DATE] ... "Issues to download: \"latest\" or dates as YYYYMMDD")
                .default_value("latest"),
        )
        .arg(clap::arg!(-e --edition <EDITION> "Edition code or title, e.g. \"az-d\" or \"Dürener Zeitung\""))
        .arg(clap::arg!(--user <USER> "Login name"))
        .arg(clap::arg!(--password <PASSWORD> "Login password"))
        .arg(
            clap::Arg::new("list_editions")
                .long("list-editions")
                .action(clap::ArgAction::SetTrue)
                .help("List the available editions and exit"),
        )
        .arg(
            clap::Arg::new("output_dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .default_value(".")
                .value_parser(clap::value_parser!(std::path::PathBuf))
                .help("Directory the EPUB files are written to"),
        )
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(
            clap::Arg::new("user_agent")
                .long("user-agent")
                .value_name("UA")
                .help("Custom User-Agent for HTTP requests"),
        )
        .arg(
            clap::Arg::new("base_url")
                .long("base-url")
                .value_name("URL")
                .help("Root URL of the e-paper service"),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "epaper", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "epaper", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "epaper", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "epaper", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
