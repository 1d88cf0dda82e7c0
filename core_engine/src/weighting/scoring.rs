/// `1 - 0.5 * strength`, with strength clamped to `[0, 1]`.
pub fn decay_factor(strength: f64) -> f64 {
    let strength = if strength.is_nan() {
        0.0
    } else {
        strength.clamp(0.0, 1.0)
    };
    1.0 - 0.5 * strength
}

/// Shrinks `count` geometrically per prior win, never below 1.
pub fn adjusted_count(count: u32, decay: f64, wins: u32) -> u32 {
    if wins == 0 {
        return count.max(1);
    }
    let exponent = i32::try_from(wins).unwrap_or(i32::MAX);
    let scaled = (f64::from(count) * decay.powi(exponent)).floor();
    if scaled >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    (scaled as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_bounds() {
        assert_eq!(decay_factor(0.0), 1.0);
        assert_eq!(decay_factor(1.0), 0.5);
        assert_eq!(decay_factor(0.5), 0.75);
        assert_eq!(decay_factor(-3.0), 1.0);
        assert_eq!(decay_factor(7.0), 0.5);
        assert_eq!(decay_factor(f64::NAN), 1.0);
    }

    #[test]
    fn shrinks_per_win() {
        assert_eq!(adjusted_count(4, 0.5, 1), 2);
        assert_eq!(adjusted_count(8, 0.5, 2), 2);
        assert_eq!(adjusted_count(4, 0.75, 1), 3);
        assert_eq!(adjusted_count(10, 1.0, 50), 10);
    }

    #[test]
    fn never_below_one() {
        assert_eq!(adjusted_count(1, 0.5, 1), 1);
        assert_eq!(adjusted_count(3, 0.5, 40), 1);
        assert_eq!(adjusted_count(u32::MAX, 0.5, u32::MAX), 1);
    }
}
