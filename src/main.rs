fn main() {
    astrewrite::cli::run();
}
