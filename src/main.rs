fn main() {
    #[cfg(feature = "cli")]
    zpatch::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("zpatch: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
