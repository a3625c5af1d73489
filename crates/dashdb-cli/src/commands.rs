//! Command handlers.

use dashdb_core::Predicate;

use crate::app::{finish_mutation, open_collection, parse_object};
use crate::cli::{
    AppendArgs, Cli, CollectionArgs, Commands, DeleteArgs, GetArgs, UpdateArgs, WhereArgs,
};
use crate::output::{print_records, record_json};

pub fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::List(args) => handle_list(cli, args),
        Commands::Append(args) => handle_append(cli, args),
        Commands::Where(args) => handle_where(cli, args),
        Commands::Update(args) => handle_update(cli, args),
        Commands::Delete(args) => handle_delete(cli, args),
        Commands::Get(args) => handle_get(cli, args),
        Commands::Path(args) => handle_path(cli, args),
    }
}

fn handle_list(cli: &Cli, args: &CollectionArgs) -> anyhow::Result<()> {
    let store = open_collection(cli, &args.name)?;
    print_records(&store.all()?, &store.reserved_keys()?);
    Ok(())
}

fn handle_append(cli: &Cli, args: &AppendArgs) -> anyhow::Result<()> {
    let items = args
        .records
        .iter()
        .map(|raw| parse_object("record", raw))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let store = open_collection(cli, &args.name)?;
    let created = store.append(items)?;
    finish_mutation(&store)?;

    if !cli.quiet {
        print_records(&created, &store.reserved_keys()?);
    }
    Ok(())
}

fn handle_where(cli: &Cli, args: &WhereArgs) -> anyhow::Result<()> {
    let predicate = Predicate::from(parse_object("predicate", &args.predicate)?);
    let store = open_collection(cli, &args.name)?;
    print_records(&store.filter(&predicate)?, &store.reserved_keys()?);
    Ok(())
}

fn handle_update(cli: &Cli, args: &UpdateArgs) -> anyhow::Result<()> {
    let predicate = Predicate::from(parse_object("--where", &args.predicate)?);
    let changes = parse_object("--set", &args.set)?;

    let store = open_collection(cli, &args.name)?;
    let count = store.update(&predicate, &changes)?;
    finish_mutation(&store)?;

    if !cli.quiet {
        println!("Updated {} record(s)", count);
    }
    Ok(())
}

fn handle_delete(cli: &Cli, args: &DeleteArgs) -> anyhow::Result<()> {
    let predicate = Predicate::from(parse_object("--where", &args.predicate)?);

    let store = open_collection(cli, &args.name)?;
    let count = store.delete(&predicate)?;
    finish_mutation(&store)?;

    if !cli.quiet {
        println!("Deleted {} record(s)", count);
    }
    Ok(())
}

fn handle_get(cli: &Cli, args: &GetArgs) -> anyhow::Result<()> {
    let store = open_collection(cli, &args.name)?;
    let record = store
        .find(&args.id)?
        .ok_or_else(|| anyhow::anyhow!("Record '{}' not found in '{}'", args.id, args.name))?;
    println!("{}", record_json(&record, &store.reserved_keys()?));
    Ok(())
}

fn handle_path(cli: &Cli, args: &CollectionArgs) -> anyhow::Result<()> {
    let store = open_collection(cli, &args.name)?;
    println!("{}", store.file_path().display());
    Ok(())
}
