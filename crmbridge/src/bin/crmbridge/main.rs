mod commands;
mod examples;
mod output;
mod theme;

use std::fmt::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand};
use colored::control::ShouldColorize;
use crmbridge::BridgeConfig;
use crmbridge::config::CONFIG_ENV_VAR;

use commands::{
    egress::{EgressArgs, handle_egress},
    option::{OptionArgs, handle_option},
    schema::{SchemaArgs, handle_schema},
};
use examples::{ExampleGroup, examples_for};
use output::{Console, GlobalOptions, OutputFormat};
use theme::{GLYPHS, PALETTE};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    (CONFIG_ENV_VAR, "Path to crmbridge.toml (default: ./crmbridge.toml)"),
    ("RUST_LOG", "Log filter, e.g. crmbridge=debug to trace every field decision"),
];

#[derive(Parser)]
#[command(name = "crmbridge", version)]
#[command(
    about = "Inspect CRM entity schemas and preview attribute conversions",
    long_about = r#"Field mapping and type coercion between CRM attribute sets and generated record types:

• Entity schema inspection, including generated field names
• Option set code and name translation
• Dry-run of the update payload built from a set of typed values"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Config file
    #[arg(long, env = CONFIG_ENV_VAR, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the fields of an entity schema
    Schema(SchemaArgs),

    /// Translate an option set code to its name, or a name to its code
    #[command(name = "option")]
    OptionValue(OptionArgs),

    /// Preview the native attributes an update would write
    Egress(EgressArgs),
}

/// The clap command with styles, the environment appendix and per-command examples attached.
fn cli_command(use_color: bool) -> Command {
    let mut command = Cli::command()
        .styles(help_styles())
        .color(if use_color { ColorChoice::Auto } else { ColorChoice::Never })
        .after_long_help(environment_appendix(use_color));

    for subcommand in command.get_subcommands_mut() {
        if let Some(groups) = examples_for(subcommand.get_name()) {
            *subcommand = std::mem::take(subcommand).after_long_help(render_examples(groups, use_color));
        }
    }
    command
}

fn help_styles() -> Styles {
    Styles::styled()
        .usage(AnsiColor::BrightBlue.on_default() | Effects::BOLD)
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Magenta.on_default())
        .placeholder(AnsiColor::BrightBlack.on_default())
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

fn paint_if(text: &str, color: colored::Color, bold: bool, use_color: bool) -> String {
    use colored::Colorize;

    match (use_color, bold) {
        (false, _) => text.to_string(),
        (true, false) => text.color(color).to_string(),
        (true, true) => text.color(color).bold().to_string(),
    }
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let mut buffer = format!("{}\n", paint_if("Examples:", PALETTE.title, true, use_color));
    let blocks: Vec<String> = groups
        .iter()
        .map(|group| {
            let mut block = format!("  {}\n", paint_if(group.title, PALETTE.label, true, use_color));
            for line in group.commands {
                let _ = writeln!(
                    block,
                    "    {} {}",
                    paint_if(GLYPHS.pointer, PALETTE.faint, false, use_color),
                    paint_if(line, PALETTE.command, false, use_color)
                );
            }
            block
        })
        .collect();
    buffer.push_str(&blocks.join("\n"));
    buffer
}

fn environment_appendix(use_color: bool) -> String {
    let mut buffer = format!("{}\n", paint_if("Environment Variables:", PALETTE.title, true, use_color));
    for (name, description) in ENVIRONMENT_VARIABLES {
        let _ = writeln!(
            buffer,
            "  {}  {}",
            paint_if(name, PALETTE.label, true, use_color),
            paint_if(description, PALETTE.text, false, use_color)
        );
    }
    let _ = write!(
        buffer,
        "\n{} {}",
        paint_if("Tip:", PALETTE.title, true, use_color),
        paint_if(
            "Use 'crmbridge <command> --help' to view examples for each command.",
            PALETTE.faint,
            false,
            use_color
        )
    );
    buffer
}

fn main() {
    env_logger::init();

    let use_color = ShouldColorize::from_env().should_colorize();
    let matches = cli_command(use_color).get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());

    if cli.no_color {
        colored::control::set_override(false);
    }

    let console = Console::new(GlobalOptions {
        output_format: cli.output.clone(),
        quiet: cli.quiet,
        no_color: cli.no_color,
    });

    if let Err(err) = execute(cli, &console) {
        console.failure(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn execute(cli: Cli, console: &Console) -> Result<()> {
    match cli.command {
        Commands::Schema(args) => handle_schema(args, console),
        Commands::OptionValue(args) => handle_option(args, console),
        Commands::Egress(args) => {
            let dir = std::env::current_dir().context("Failed to get current directory")?;
            let config = BridgeConfig::discover(cli.config.as_deref(), &dir).context("Failed to load configuration")?;
            handle_egress(args, config, console)
        }
    }
}
