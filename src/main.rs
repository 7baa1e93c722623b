fn main() -> anyhow::Result<()>
{
        typefield::run()
}
