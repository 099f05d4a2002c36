fn main() {
    clustering_tools::cli::run();
}
