use clap::Parser;

/// Flags for the `razornav` binary.
#[derive(Parser, Debug)]
#[command(name = "razornav", version, about = "Navigation language server for MVC projects")]
pub struct Args {
    /// Serve over stdio. This is the only transport; the flag exists because
    /// several editors pass it unconditionally.
    #[arg(long)]
    pub stdio: bool,
}
