use anyhow::{bail, Context};
use bst_map::team::{Game, Player, Role, Team};
use bst_map::BstMap;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap as StdBTreeMap;
use std::time::Instant;

const DEFAULT_COUNT: usize = 100_000;
const DEFAULT_SEED: u64 = 42;

fn parse_arg<T: std::str::FromStr>(args: &[String], idx: usize, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match args.get(idx) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("argument {} ({:?}) is not a number", idx, raw)),
        None => Ok(default),
    }
}

fn season() -> anyhow::Result<Team> {
    let mut team = Team::new("Ice Wolves", "Ivan Petrov");
    let day = 24 * 3600;
    let start = 1_704_103_200;
    let roster = [
        ("Smirnov", Role::Forward),
        ("Volkov", Role::Forward),
        ("Orlov", Role::Defender),
        ("Sokolov", Role::Defender),
        ("Kuznetsov", Role::Goalkeeper),
    ];
    let opponents = ["Red Bears", "Blue Sharks", "Green Owls", "Black Cats"];
    for week in 0..8u64 {
        let mut game = Game::new(start + week * 7 * day, opponents[week as usize % opponents.len()], 1000);
        for (i, (name, role)) in roster.iter().enumerate() {
            let minutes = 20 + (week as usize * 7 + i * 13) % 40;
            game.add_player(Player::new(*name, *role, minutes, (week as usize + i) % 5));
        }
        team.add_game(game)?;
    }
    Ok(team)
}

fn report(team: &Team) -> anyhow::Result<()> {
    let (first, _) = team
        .games()
        .first_key_value()
        .context("season has no games")?;
    println!("Team: {}", team.name());
    println!("Trainer: {}", team.coach());
    println!("Games: {}", team.games().len());
    println!("Penalty minutes in the opener: {}", team.total_penalty_time(*first)?);
    for (role, (name, minutes)) in &team.most_active_players() {
        println!("Most active {}: {} ({} min)", role, name, minutes);
    }
    Ok(())
}

fn benchmark(n: usize, seed: u64) -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = Instant::now();
    let mut map = BstMap::new();
    for _ in 0..n {
        let key: u32 = rng.gen();
        map.insert(key, key.wrapping_add(1));
    }
    let keys: Vec<_> = map.keys().copied().collect();
    for k in keys {
        map.erase_key(&k);
    }
    let our_time = start.elapsed();
    if !map.is_empty() {
        bail!("{} elements left after erasing every key", map.len());
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let start = Instant::now();
    let mut std_map = StdBTreeMap::new();
    for _ in 0..n {
        let key: u32 = rng.gen();
        std_map.entry(key).or_insert(key.wrapping_add(1));
    }
    let keys: Vec<_> = std_map.keys().copied().collect();
    for k in keys {
        std_map.remove(&k);
    }
    let std_time = start.elapsed();

    println!("Our BstMap:    {:?}", our_time);
    println!("Std BTreeMap:  {:?}", std_time);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let count = parse_arg(&args, 1, DEFAULT_COUNT)?;
    let seed = parse_arg(&args, 2, DEFAULT_SEED)?;

    let team = season()?;
    report(&team)?;

    info!("benchmarking {} random keys with seed {}", count, seed);
    benchmark(count, seed)
}
