//! Random gadget codenames ("Adjective Animal")

use rand::Rng;
use rand::seq::SliceRandom;

const ADJECTIVES: &[&str] = &[
    "Agile", "Amber", "Ancient", "Bold", "Brave", "Bright", "Calm", "Clever", "Crimson",
    "Curious", "Daring", "Dusky", "Eager", "Electric", "Fearless", "Fierce", "Gentle", "Gilded",
    "Hidden", "Hollow", "Icy", "Iron", "Jolly", "Keen", "Lucky", "Lunar", "Mighty", "Misty",
    "Nimble", "Noble", "Obsidian", "Proud", "Quiet", "Rapid", "Restless", "Rusty", "Scarlet",
    "Shadow", "Silent", "Silver", "Sly", "Solar", "Stealthy", "Swift", "Tactical", "Thunder",
    "Velvet", "Vivid", "Wild", "Wise",
];

const ANIMALS: &[&str] = &[
    "Albatross", "Badger", "Barracuda", "Bat", "Bear", "Beetle", "Bison", "Cobra", "Condor",
    "Coyote", "Crane", "Dolphin", "Dragonfly", "Eagle", "Falcon", "Ferret", "Fox", "Gecko",
    "Hawk", "Heron", "Hornet", "Ibis", "Jackal", "Jaguar", "Kestrel", "Kraken", "Lemur",
    "Leopard", "Lynx", "Mamba", "Mantis", "Marten", "Mongoose", "Moth", "Narwhal", "Ocelot",
    "Octopus", "Orca", "Osprey", "Owl", "Panther", "Puma", "Raven", "Scorpion", "Shark",
    "Sparrow", "Stingray", "Viper", "Wolf", "Wolverine",
];

/// Build a capitalized two-word codename
pub fn generate_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("Nameless");
    let animal = ANIMALS.choose(rng).copied().unwrap_or("Gadget");
    format!("{} {}", adjective, animal)
}

/// Codename with a numeric suffix, for when plain names keep colliding
pub fn generate_suffixed_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: u16 = rng.gen_range(100..1000);
    format!("{} {}", generate_name(rng), suffix)
}

/// Random mission success estimate, 1-100 inclusive
pub fn success_probability<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.gen_range(1..=100)
}
