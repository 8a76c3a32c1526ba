//! Tally CLI
//!
//! Prices a fixture order draft against its catalog and prints the summary.

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use tracing::info;

use tally::{
    cart::Cart, config::Config, fixtures::Fixture, observability::init_subscriber,
    receipt::OrderSummary,
};

fn main() -> Result<()> {
    let config = Config::parse();

    init_subscriber(&config.logging)?;

    let fixture = Fixture::from_set_in(&config.fixtures_dir, &config.fixture)?;
    let order = fixture.order()?;

    info!(
        fixture = %config.fixture,
        lines = order.lines.len(),
        currency = fixture.currency().iso_alpha_code,
        "pricing order"
    );

    let mut cart = Cart::new(fixture.currency());
    let summary = OrderSummary::price(&mut cart, fixture.catalog()?, order)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    summary.write_to(&mut handle)?;

    if config.submission {
        writeln!(handle, "\n{}", order.submission().to_json()?)?;
    }

    Ok(())
}
