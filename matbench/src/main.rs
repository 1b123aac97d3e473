fn main() -> anyhow::Result<()> {
    matbench_cli::run()
}
