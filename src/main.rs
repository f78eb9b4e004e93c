fn main() {
    if let Err(err) = mall_dashboard::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
