fn main() -> anyhow::Result<()> {
    bazi_oracle_lib::run()
}
