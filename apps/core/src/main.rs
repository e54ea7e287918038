fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match confluence_crx_core::runtime::parse_cli_args(&args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("[confluence-crx] {error}");
            std::process::exit(2);
        }
    };

    if let Err(error) = confluence_crx_core::runtime::run_with_options(options) {
        eprintln!("[confluence-crx] runtime failed: {error}");
        std::process::exit(1);
    }
}
