//! Grazi Rules CLI
//!
//! Browse the grammar rule tree and persist rule overrides.
//!
//! Usage:
//!   grazi-rules list [--filter <text>] [--json]   # Show the rule tree
//!   grazi-rules show <rule-id>                    # Show rule details
//!   grazi-rules toggle --enable a,b --disable c   # Change rules and save
//!   grazi-rules stats                             # Rule counts per language

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use grazi_rules::{Config, Row, RuleRegistry, RulesTree, StaticRegistry, TextStyle};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = ".grazirc.yaml";

#[derive(Parser)]
#[command(
    name = "grazi-rules",
    version,
    about = "Grammar rule browser",
    long_about = "Browse grammar rules by language and category, and enable or disable them."
)]
struct Cli {
    /// Configuration file path (default: .grazirc.yaml, then ~/.grazirc.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Additional rule files (YAML or JSON)
    #[arg(short, long, global = true)]
    rules: Vec<PathBuf>,

    /// Do not load the bundled rule set
    #[arg(long, global = true)]
    no_builtin: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the rule tree
    List {
        /// Only show languages, categories and rules matching this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show rule details
    Show {
        /// Rule ID
        rule_id: String,
    },

    /// Enable or disable rules and save the change to the config file
    Toggle {
        /// Rules to enable (comma-separated)
        #[arg(long, value_delimiter = ',')]
        enable: Vec<String>,

        /// Rules to disable (comma-separated)
        #[arg(long, value_delimiter = ',')]
        disable: Vec<String>,

        /// Print the change without saving it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show rule counts per language
    Stats,
}

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(&cli) {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load_or_default(cli.config.as_deref()).context("Failed to load config")?;

    let registry = load_registry(cli, &config)?;

    match &cli.command {
        Commands::List { filter, json } => handle_list(&registry, filter.as_deref(), *json),
        Commands::Show { rule_id } => handle_show(&registry, rule_id),
        Commands::Toggle {
            enable,
            disable,
            dry_run,
        } => {
            let path = cli
                .config
                .clone()
                .or_else(Config::find_default)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
            handle_toggle(&registry, config, &path, enable, disable, *dry_run)
        }
        Commands::Stats => handle_stats(&registry),
    }
}

fn load_registry(cli: &Cli, config: &Config) -> Result<StaticRegistry> {
    let mut registry = if cli.no_builtin {
        StaticRegistry::new()
    } else {
        StaticRegistry::builtin().context("Failed to load bundled rules")?
    };

    for path in cli.rules.iter().chain(config.rule_files.iter()) {
        registry
            .load_file(path)
            .with_context(|| format!("Failed to load rules from {}", path.display()))?;
    }

    registry.set_config(config.clone());
    Ok(registry)
}

fn handle_list(registry: &StaticRegistry, filter: Option<&str>, json: bool) -> Result<()> {
    let mut tree = RulesTree::new(registry);
    tree.set_filter(filter);
    let rows = tree.rows();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No rules match");
        return Ok(());
    }

    for row in &rows {
        let mark = if row.checked { "[x]" } else { "[ ]" };
        println!("{}{} {}", "  ".repeat(row.depth), mark, render_text(row));
    }
    Ok(())
}

fn render_text(row: &Row) -> String {
    let styled = |s: &str| match row.style {
        TextStyle::Bold => s.bold().to_string(),
        TextStyle::Regular => s.to_string(),
    };

    let mut out = String::new();
    let mut pos = 0;
    for range in &row.highlights {
        out.push_str(&styled(&row.text[pos..range.start]));
        out.push_str(&row.text[range.clone()].yellow().bold().to_string());
        pos = range.end;
    }
    out.push_str(&styled(&row.text[pos..]));
    out
}

fn handle_show(registry: &StaticRegistry, rule_id: &str) -> Result<()> {
    let Some(rule) = registry.rule(rule_id) else {
        bail!("Unknown rule: {}", rule_id);
    };
    let language = registry
        .languages()
        .iter()
        .find(|l| l.id == rule.lang)
        .map_or(rule.lang.as_str(), |l| l.display_name.as_str());

    let on_off = |enabled: bool| {
        if enabled {
            "enabled".green()
        } else {
            "disabled".red()
        }
    };

    println!("{}", rule.id.bold());
    println!("  {}", rule.description);
    println!();
    println!("  Language: {}", language);
    println!("  Category: {}", rule.category);
    println!("  Default:  {}", on_off(rule.enabled));
    println!("  Current:  {}", on_off(registry.baseline(&rule.id)));
    if let Some(url) = &rule.url {
        println!("  Docs:     {}", url);
    }
    if let Some(bad) = &rule.example_bad {
        println!();
        println!("  {} {}", "Incorrect:".red(), bad);
    }
    if let Some(good) = &rule.example_good {
        println!("  {}   {}", "Correct:".green(), good);
    }
    Ok(())
}

fn handle_toggle(
    registry: &StaticRegistry,
    mut config: Config,
    path: &Path,
    enable: &[String],
    disable: &[String],
    dry_run: bool,
) -> Result<()> {
    let mut tree = RulesTree::new(registry);

    for (ids, checked) in [(enable, true), (disable, false)] {
        for id in ids {
            toggle_in_tree(&mut tree, id, checked)?;
        }
    }

    let state = tree.state();
    if state.is_empty() {
        println!("No changes");
        return Ok(());
    }

    for id in &state.enabled {
        println!("{} {}", "+".green().bold(), id);
    }
    for id in &state.disabled {
        println!("{} {}", "-".red().bold(), id);
    }

    if dry_run {
        println!("Dry run, {} not modified", path.display());
        return Ok(());
    }

    config.apply(&state);
    config
        .save(path)
        .with_context(|| format!("Failed to save config {}", path.display()))?;
    println!("Saved {}", path.display());
    Ok(())
}

/// Toggle a rule shown in the tree. Rules of deselected languages exist in
/// the registry but are not shown.
fn toggle_in_tree(tree: &mut RulesTree<&StaticRegistry>, id: &str, checked: bool) -> Result<()> {
    if tree.toggle_rule(id, checked) {
        return Ok(());
    }
    match tree.registry().rule(id) {
        Some(rule) => bail!("Rule {} belongs to disabled language '{}'", id, rule.lang),
        None => bail!("Unknown rule: {}", id),
    }
}

fn handle_stats(registry: &StaticRegistry) -> Result<()> {
    let hierarchy = registry.all_rules_by_language();

    println!(
        "{:<16} {:>10} {:>6} {:>8}",
        "Language", "Categories", "Rules", "Enabled"
    );
    for entry in &hierarchy.languages {
        let enabled = entry
            .categories
            .iter()
            .flat_map(|c| c.rules.iter())
            .filter(|r| r.enabled)
            .count();
        println!(
            "{:<16} {:>10} {:>6} {:>8}",
            entry.language.display_name,
            entry.categories.len(),
            entry.rule_count(),
            enabled
        );
    }

    let enabled = hierarchy.rules().filter(|r| r.enabled).count();
    println!(
        "{:<16} {:>10} {:>6} {:>8}",
        "Total",
        hierarchy.category_count(),
        hierarchy.rule_count(),
        enabled
    );
    Ok(())
}
