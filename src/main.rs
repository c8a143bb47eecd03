use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cfg = nivis_tui::config::Config::parse();
    nivis_tui::app::run(cfg)
}
