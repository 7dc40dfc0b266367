fn main() {
    #[cfg(feature = "cli")]
    oxibr::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("oxibr: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
