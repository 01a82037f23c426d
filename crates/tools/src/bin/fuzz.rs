use std::env;
use std::io;

use anyhow::{Result, anyhow, bail};
use clap::{Parser, value_parser};
use deck::{Card, Damage, Deck, scan};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 10_000)]
    ops: u32,
    /// Largest offense, defense and hit rolled
    #[arg(short, long, default_value_t = 20, value_parser = value_parser!(i32).range(1..))]
    max_stat: i32,
}

fn roll(rng: &mut ChaCha8Rng, max: i32) -> i32 {
    1 + (rng.next_u64() % max as u64) as i32
}

fn pick(rng: &mut ChaCha8Rng, len: usize) -> usize {
    rng.next_u64() as usize % len
}

/// Compares both deck queries against a linear scan of `cards`.
fn cross_check(deck: &Deck, cards: &[Card], offense: i32, defense: i32, step: u32) -> Result<()> {
    let expected = scan::battle_card(cards, offense, defense).map(|(p, card)| (p, card.key()));
    let actual = deck.battle_pick(offense, defense).map(|(p, card)| (p, card.key()));
    if actual != expected {
        bail!("step {step}: battle({offense}, {defense}) gave {actual:?}, scan gave {expected:?}");
    }
    let expected = scan::steal_candidate(cards, offense, defense).map(Card::key);
    let actual = deck.find_best_steal_candidate(offense, defense).map(Card::key);
    if actual != expected {
        bail!("step {step}: steal({offense}, {defense}) gave {actual:?}, scan gave {expected:?}");
    }
    Ok(())
}

/// `RUST_LOG`-style directives, falling back to `info` when none are given.
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).parse_lossy(directives)
}

fn main() -> Result<()> {
    let directives = env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&directives))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    info!(seed = args.seed, ops = args.ops, max_stat = args.max_stat, "starting deck fuzz");

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut deck = Deck::new();
    let mut cards: Vec<Card> = Vec::new();

    for step in 0..args.ops {
        match rng.next_u64() % 8 {
            // Bias towards growth so the trees get deep.
            0..=3 => {
                let card = Card::new(
                    format!("F{step}"),
                    roll(&mut rng, args.max_stat),
                    roll(&mut rng, args.max_stat),
                    deck.issue_order(),
                );
                cards.push(card.clone());
                deck.insert(card);
            }
            4 | 5 if !cards.is_empty() => {
                let card = cards.swap_remove(pick(&mut rng, cards.len()));
                if !deck.delete(&card) {
                    bail!("step {step}: {:?} missing from deck", card.key());
                }
            }
            6 if !cards.is_empty() => {
                let index = pick(&mut rng, cards.len());
                let hit = roll(&mut rng, args.max_stat);
                let Some(mut card) = deck.checkout(cards[index].key()) else {
                    bail!("step {step}: checkout of {:?} failed", cards[index].key());
                };
                if card.apply_damage(hit) == Damage::Eliminated {
                    card.discard();
                    cards.swap_remove(index);
                } else {
                    card.refresh_order();
                    drop(card);
                    let name = cards[index].name.clone();
                    let Some(moved) = deck.iter().find(|card| card.name == name) else {
                        bail!("step {step}: {name} was not requeued");
                    };
                    cards[index] = moved.clone();
                }
            }
            _ => {
                let offense = roll(&mut rng, args.max_stat.saturating_add(1)) - 1;
                let defense = roll(&mut rng, args.max_stat.saturating_add(1)) - 1;
                cross_check(&deck, &cards, offense, defense, step)?;
            }
        }

        if deck.count() != cards.len() {
            bail!("step {step}: deck holds {} cards, expected {}", deck.count(), cards.len());
        }
        if step % 64 == 0 {
            deck.validate().map_err(|violation| anyhow!("step {step}: {violation}"))?;
            debug!(step, count = deck.count(), bands = deck.band_count(), "audit passed");
        }
    }

    deck.validate()?;
    println!(
        "Fuzzing completed: {} cards in {} bands, snapshot hash {:#018x}",
        deck.count(),
        deck.band_count(),
        deck.snapshot_hash()
    );
    Ok(())
}
