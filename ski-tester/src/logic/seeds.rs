use anyhow::{Context, Result, bail};

const DEFAULT_SEED: u64 = 1337;

/// Resolve CLI seed tokens into a deduplicated, ordered seed list.
///
/// Supports literal integers (negative values use their magnitude) and
/// inclusive ranges written `start..end`.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds: Vec<u64> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            push_unique(&mut seeds, value.unsigned_abs());
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            push_unique(&mut seeds, value);
            continue;
        }

        if let Some((start, end)) = token.split_once("..") {
            let start: u64 = start
                .trim()
                .parse()
                .with_context(|| format!("invalid range start in seed token: {token}"))?;
            let end: u64 = end
                .trim()
                .parse()
                .with_context(|| format!("invalid range end in seed token: {token}"))?;
            if end < start {
                bail!("Seed range runs backwards: {token}");
            }
            for seed in start..=end {
                push_unique(&mut seeds, seed);
            }
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }

    Ok(seeds)
}

fn push_unique(seeds: &mut Vec<u64>, seed: u64) {
    if !seeds.contains(&seed) {
        seeds.push(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolves_numeric_negative_and_ranges() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "3..5", "4"])).unwrap();
        assert_eq!(seeds, vec![42, 7, 3, 4, 5]);
    }

    #[test]
    fn empty_input_falls_back_to_default() {
        assert_eq!(resolve_seed_inputs(&[]).unwrap(), vec![DEFAULT_SEED]);
    }

    #[test]
    fn rejects_garbage_and_backwards_ranges() {
        assert!(resolve_seed_inputs(&tokens(&["powder"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["9..2"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["1..x"])).is_err());
    }
}
