//! Demonstration driver for the revLANG IR.
//!
//! Builds a small module, prints it before and after removing some of its
//! functions, and exports the CFG of a diamond shaped function as graphviz.
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use revlang_ir::{prelude::*, render_to, write_cfg_dot, BlockOrder, DotConfig, FuncRef, Module};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "revlang")]
#[command(version)]
#[command(about = "revLANG IR demonstration driver", long_about = None)]
struct Cli {
    /// Path of the generated graphviz file
    #[arg(long, default_value = "revLang-cfg.dot")]
    dot_output: PathBuf,

    /// Order in which blocks emit their edges
    #[arg(long, value_enum, default_value = "reverse")]
    dot_order: DotOrder,

    /// Quote graph and node ids
    #[arg(long)]
    quote_ids: bool,

    /// Emit nodes labelled with the instructions of each block
    #[arg(long)]
    rich: bool,
}

#[derive(ValueEnum, Clone, Copy)]
enum DotOrder {
    /// Last inserted block first
    Reverse,
    /// First inserted block first
    Insertion,
}

impl From<DotOrder> for BlockOrder {
    fn from(order: DotOrder) -> Self {
        match order {
            DotOrder::Reverse => BlockOrder::Reverse,
            DotOrder::Insertion => BlockOrder::Insertion,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    println!("=== revLang interpreter ===");

    let mut module = Module::new("my-module.revLang");
    let gv0 = module.try_make_gv(0)?;
    let gv1 = module.try_make_gv(1)?;
    let gv2 = module.try_make_gv(2)?;

    let fn1 = module.try_make_func("fn1")?;
    let bb0 = module.try_make_block(fn1, "bb.0", true)?;
    module.try_append_inst(bb0, Add::try_new(&[gv0, gv1, gv2])?)?;
    let bb1 = module.try_make_block(fn1, "bb.1", false)?;
    module.try_add_succ(bb0, "true", bb1)?;
    module.try_append_inst(bb1, Load::try_new(&[gv0])?)?;
    let bb2 = module.try_make_block(fn1, "bb.2", false)?;
    module.try_add_succ(bb1, "false", bb2)?;
    module.try_append_inst(bb2, Store::try_new(&[gv1, gv2])?)?;

    let fn2 = module.try_make_func("fn2")?;
    let fn2_blocks = [
        module.try_make_block(fn2, "bb.0", true)?,
        module.try_make_block(fn2, "bb.1", false)?,
        module.try_make_block(fn2, "bb.2", false)?,
    ];

    let fn3 = module.try_make_func("fn3")?;
    let fn3_entry = module.try_make_block(fn3, "bb.0", true)?;
    let store = module.try_append_inst(fn3_entry, Store::try_new(&[gv1, gv2])?)?;
    let fn3_blocks = [
        fn3_entry,
        module.try_make_block(fn3, "bb.1", false)?,
        module.try_make_block(fn3, "bb.2", false)?,
    ];

    let fn4 = module.try_make_func("fn4")?;

    report_validity(&module);
    println!("*** Module before the optimizations ***");
    module.dump()?;

    module.try_remove_func(fn4)?;

    for block in fn2_blocks {
        module.try_remove_block(block)?;
    }
    module.try_remove_func(fn2)?;

    module.remove_inst(store);
    for block in fn3_blocks {
        module.try_remove_block(block)?;
    }
    module.try_remove_func(fn3)?;

    println!("*** Module after the optimizations ***");
    module.dump()?;

    let foo = module.try_make_func("foo")?;
    let entry = module.try_make_block(foo, "entry", true)?;
    let h = module.try_make_block(foo, "H", false)?;
    module.try_add_succ(entry, "true", h)?;
    let i = module.try_make_block(foo, "I", false)?;
    module.try_add_succ(entry, "false", i)?;
    let j = module.try_make_block(foo, "J", false)?;
    module.try_add_succ(h, "", j)?;
    module.try_add_succ(i, "", j)?;
    report_validity(&module);

    let config = DotConfig {
        block_order: cli.dot_order.into(),
        quote_ids: cli.quote_ids,
    };
    write_dot(&module, foo, &cli, &config)
        .with_context(|| format!("failed to write `{}`", cli.dot_output.display()))?;
    info!(path = %cli.dot_output.display(), rich = cli.rich, "wrote CFG of `foo`");

    Ok(())
}

fn report_validity(module: &Module) {
    for func_ref in module.iter_functions() {
        info!(
            func = %module.func(func_ref).name(),
            valid = module.is_valid(func_ref),
            "checked reachability"
        );
    }
}

fn write_dot(module: &Module, func_ref: FuncRef, cli: &Cli, config: &DotConfig) -> Result<()> {
    let mut file = BufWriter::new(File::create(&cli.dot_output)?);
    if cli.rich {
        render_to(module, func_ref, &mut file)?;
    } else {
        write_cfg_dot(module, func_ref, &mut file, config)?;
    }
    file.flush()?;
    Ok(())
}
