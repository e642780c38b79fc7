fn main() {
    mdxalchemy::cli::run();
}
