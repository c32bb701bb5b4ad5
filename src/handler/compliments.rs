//! Compliments for sub-minute sets.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::models::UserId;

pub const DEFAULT_COMPLIMENTS: [&str; 8] = [
    ":tada: Nice job",
    ":knife: You're killing it",
    ":heart: Impressive",
    ":zap: You're a sub-minute superstar",
    ":trophy: Keep this up and you'll be champion soon",
    ":star-struck: You're a force to be reckoned with",
    ":four_leaf_clover: I hope the rest of your day goes as well as your daily set did",
    ":coffee: I see you're putting that coffee to good use",
];

/// A pool of compliments picked uniformly at random.
pub struct Compliments {
    pool: Vec<String>,
    rng: Mutex<StdRng>,
}

impl Compliments {
    /// The built-in pool with an entropy-seeded generator.
    pub fn new() -> Self {
        Self::with_rng(default_pool(), StdRng::from_entropy())
    }

    /// The built-in pool with a fixed seed, for reproducible picks.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(default_pool(), StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(pool: Vec<String>, rng: StdRng) -> Self {
        Self {
            pool,
            rng: Mutex::new(rng),
        }
    }

    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    /// Pick a compliment and address it to `user`, e.g.
    /// `:tada: Nice job, <@U1>!`.
    pub fn pick_for(&self, user: &UserId) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        match self.pool.choose(&mut *rng) {
            Some(compliment) => format!("{}, {}!", compliment, user.mention()),
            None => format!("Nice job, {}!", user.mention()),
        }
    }
}

impl Default for Compliments {
    fn default() -> Self {
        Self::new()
    }
}

fn default_pool() -> Vec<String> {
    DEFAULT_COMPLIMENTS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_pick_is_from_pool_and_mentions_user() {
        let compliments = Compliments::seeded(7);
        let user = UserId::from("U1");

        for _ in 0..50 {
            let text = compliments.pick_for(&user);
            let stem = text.strip_suffix(", <@U1>!").expect("addressed to user");
            assert!(DEFAULT_COMPLIMENTS.contains(&stem), "unexpected {text}");
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a = Compliments::seeded(42);
        let b = Compliments::seeded(42);
        let user = UserId::from("U1");

        let seq_a: Vec<_> = (0..10).map(|_| a.pick_for(&user)).collect();
        let seq_b: Vec<_> = (0..10).map(|_| b.pick_for(&user)).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn test_covers_the_pool() {
        let compliments = Compliments::seeded(1);
        let user = UserId::from("U1");
        let seen: HashSet<_> = (0..500).map(|_| compliments.pick_for(&user)).collect();
        assert_eq!(seen.len(), DEFAULT_COMPLIMENTS.len());
    }

    #[test]
    fn test_single_entry_pool_is_deterministic() {
        let compliments = Compliments::with_rng(
            vec![":tada: Nice job".to_string()],
            StdRng::seed_from_u64(0),
        );
        assert_eq!(
            compliments.pick_for(&UserId::from("U9")),
            ":tada: Nice job, <@U9>!"
        );
    }

    #[test]
    fn test_empty_pool_falls_back() {
        let compliments = Compliments::with_rng(Vec::new(), StdRng::seed_from_u64(0));
        assert_eq!(compliments.pick_for(&UserId::from("U9")), "Nice job, <@U9>!");
    }
}
