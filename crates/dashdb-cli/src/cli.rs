use clap::{Args, Parser, Subcommand};

use dashdb_core::VERSION;

/// DashDB - inspect and edit newline-delimited JSON collections
#[derive(Parser)]
#[command(name = "dashdb")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the collection files
    #[arg(short, long, global = true, env = "DASHDB_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Path to the config file
    #[arg(short, long, global = true, env = "DASHDB_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print every record, one JSON object per line
    List(CollectionArgs),

    /// Append one or more records
    Append(AppendArgs),

    /// Print records whose fields equal the given values
    Where(WhereArgs),

    /// Merge fields into every matching record
    Update(UpdateArgs),

    /// Delete every matching record
    Delete(DeleteArgs),

    /// Print one record by primary key
    Get(GetArgs),

    /// Print the backing file path of a collection
    Path(CollectionArgs),
}

/// Arguments naming a collection
#[derive(Args)]
pub struct CollectionArgs {
    /// Collection name
    #[arg(value_name = "NAME")]
    pub name: String,
}

/// Arguments for the `append` command
#[derive(Args)]
pub struct AppendArgs {
    /// Collection name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Records as JSON objects
    #[arg(value_name = "JSON", required = true)]
    pub records: Vec<String>,
}

/// Arguments for the `where` command
#[derive(Args)]
pub struct WhereArgs {
    /// Collection name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Field values to match, as a JSON object
    #[arg(value_name = "JSON")]
    pub predicate: String,
}

/// Arguments for the `update` command
#[derive(Args)]
pub struct UpdateArgs {
    /// Collection name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Field values to match, as a JSON object (`{}` matches every record)
    #[arg(long = "where", value_name = "JSON")]
    pub predicate: String,

    /// Fields to set, as a JSON object
    #[arg(long, value_name = "JSON")]
    pub set: String,
}

/// Arguments for the `delete` command
#[derive(Args)]
pub struct DeleteArgs {
    /// Collection name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Field values to match, as a JSON object
    #[arg(long = "where", value_name = "JSON")]
    pub predicate: String,
}

/// Arguments for the `get` command
#[derive(Args)]
pub struct GetArgs {
    /// Collection name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Primary key
    #[arg(value_name = "ID")]
    pub id: String,
}
