//! Command-line interface for xsdmap

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
use xsdmap::exports::{roles_to_json, tree_to_json_string};
#[cfg(feature = "cli")]
use xsdmap::loaders::Loader;
#[cfg(feature = "cli")]
use xsdmap::tree::{NodeId, SchemaTree};
#[cfg(feature = "cli")]
use xsdmap::{extract_dependencies, FileGroup, SchemaParser};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsdmap")]
#[command(author, version, about = "XSD structure and dependency inspection tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the node tree of a schema
    Tree {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,

        /// Leave ref nodes unresolved
        #[arg(long)]
        no_resolve: bool,

        /// Print node and reference counts instead of the tree
        #[arg(long)]
        stats: bool,
    },

    /// Show the node at a path
    Lookup {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Node path, e.g. "/complexType[@name='Bar']/sequence"
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// List the imports and includes of a schema
    Deps {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Classify a set of schema files
    Roles {
        /// Schema files, in the order used for classification
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// File name to record as master regardless of dependencies
        #[arg(short, long, value_name = "NAME")]
        master: Vec<String>,

        /// Also print connected file groups and missing dependencies
        #[arg(short, long)]
        groups: bool,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Tree {
            schema,
            json,
            no_resolve,
            stats,
        } => cmd_tree(schema, json, no_resolve, stats),
        Commands::Lookup { schema, path } => cmd_lookup(schema, path),
        Commands::Deps { schema, json } => cmd_deps(schema, json),
        Commands::Roles {
            files,
            master,
            groups,
            json,
        } => cmd_roles(files, master, groups, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn load_tree(schema_path: &Path, resolve: bool) -> Result<SchemaTree, Box<dyn std::error::Error>> {
    let text = Loader::new().load_text(schema_path)?;
    let tree = SchemaParser::new()
        .with_resolve_references(resolve)
        .try_parse(&text)
        .map_err(|e| format!("could not parse '{}': {}", schema_path.display(), e))?;
    Ok(tree)
}

#[cfg(feature = "cli")]
fn cmd_tree(
    schema_path: PathBuf,
    json_output: bool,
    no_resolve: bool,
    show_stats: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let tree = load_tree(&schema_path, !no_resolve)?;

    if show_stats {
        let stats = tree.stats();
        if json_output {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("Nodes: {}", stats.node_count);
            println!("References: {}", stats.references);
            println!("Unresolved: {}", stats.unresolved);
            println!();
            println!("Kinds:");
            for (kind, count) in &stats.kinds {
                println!("  {}: {}", kind, count);
            }
        }
        return Ok(());
    }

    if json_output {
        println!("{}", tree_to_json_string(&tree, true)?);
    } else {
        print_outline(&tree, tree.root_id(), 0);
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_outline(tree: &SchemaTree, id: NodeId, depth: usize) {
    let node = &tree[id];
    let mut line = format!("{}{}", "  ".repeat(depth), node.kind);
    if !node.name.is_empty() {
        line.push(' ');
        line.push_str(&node.name);
    }
    if node.is_reference() {
        match node.resolved_target_path() {
            Some(target) => line.push_str(&format!(" -> {}", target)),
            None => line.push_str(" -> (unresolved)"),
        }
    }
    println!("{}", line);

    for child in tree.structural_children(id) {
        print_outline(tree, child.id, depth + 1);
    }
}

#[cfg(feature = "cli")]
fn cmd_lookup(schema_path: PathBuf, path: String) -> Result<(), Box<dyn std::error::Error>> {
    let tree = load_tree(&schema_path, true)?;

    let node = tree
        .find_by_path(&path)
        .ok_or_else(|| format!("No node at path '{}'", path))?;

    println!("Kind: {}", node.kind);
    println!("Name: {}", node.name);
    println!("Path: {}", node.path);
    if !node.attributes.is_empty() {
        println!("Attributes:");
        for (key, value) in &node.attributes {
            println!("  {} = {}", key, value);
        }
    }
    if let Some(doc) = &node.documentation {
        println!("Documentation: {}", doc);
    }
    if let Some(name) = node.reference_name() {
        println!(
            "Reference: {} -> {}",
            name,
            node.resolved_target_path().unwrap_or("(unresolved)")
        );
    }
    println!("Children: {}", node.children.len());

    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_deps(schema_path: PathBuf, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let text = Loader::new().load_text(&schema_path)?;
    let dependencies = extract_dependencies(&text);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&dependencies)?);
    } else if dependencies.is_empty() {
        println!("No dependencies");
    } else {
        for dep in &dependencies {
            match &dep.namespace {
                Some(ns) => println!("{} {} ({})", dep.kind, dep.schema_location, ns),
                None => println!("{} {}", dep.kind, dep.schema_location),
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_roles(
    files: Vec<PathBuf>,
    masters: Vec<String>,
    show_groups: bool,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = Loader::new().load_set(&files)?;
    let group = FileGroup::new(loaded.into_iter().map(|file| {
        let explicit = masters.contains(&file.filename);
        file.with_explicit_master(explicit)
    }));
    let roles = group.roles();

    if json_output {
        let mut output = serde_json::Map::new();
        output.insert("roles".to_string(), roles_to_json(&roles)?);
        if show_groups {
            output.insert("groups".to_string(), serde_json::to_value(group.connected_groups())?);
            output.insert(
                "missing".to_string(),
                serde_json::to_value(group.missing_dependencies())?,
            );
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for (filename, role) in &roles {
        println!("{}: {}", filename, role);
    }

    if show_groups {
        println!();
        println!("Groups:");
        for (i, members) in group.connected_groups().iter().enumerate() {
            println!("  {}: {}", i + 1, members.join(", "));
        }

        let missing = group.missing_dependencies();
        if !missing.is_empty() {
            println!();
            println!("Missing:");
            for m in &missing {
                println!(
                    "  {} {} {}",
                    m.filename, m.dependency.kind, m.dependency.schema_location
                );
            }
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
