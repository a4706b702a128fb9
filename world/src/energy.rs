//! Per-player energy accounting.

/// Energy pool with a fixed capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnergyWallet {
    current: i32,
    maximum: i32,
}

impl EnergyWallet {
    /// Creates a wallet holding `starting` energy, clamped to `maximum`.
    #[must_use]
    pub fn new(starting: i32, maximum: i32) -> Self {
        let maximum = maximum.max(0);
        Self {
            current: starting.clamp(0, maximum),
            maximum,
        }
    }

    /// Energy currently available.
    #[must_use]
    pub const fn current(&self) -> i32 {
        self.current
    }

    /// Capacity of the wallet.
    #[must_use]
    pub const fn maximum(&self) -> i32 {
        self.maximum
    }

    /// Adds energy up to the capacity and returns the amount actually gained.
    pub fn add(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.current = self.current.saturating_add(amount.max(0)).min(self.maximum);
        self.current - before
    }

    /// Reports whether `amount` can be spent. Negative amounts never can.
    #[must_use]
    pub const fn can_afford(&self, amount: i32) -> bool {
        amount >= 0 && self.current >= amount
    }

    /// Spends `amount`, leaving the wallet untouched when it cannot afford it
    /// or the amount is negative.
    pub fn spend(&mut self, amount: i32) -> bool {
        if !self.can_afford(amount) {
            return false;
        }
        self.current -= amount;
        true
    }
}
