//! ## irrbloss-core::mac
//! **MAC address newtype shared by frame encoders, identity generation and
//! the capture classifier**

use std::fmt;

use rand::Rng;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xFF; 6]);

    pub const fn new(octets: [u8; 6]) -> Self {
        MacAddr(octets)
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Locally administered bit (bit 1 of the first octet).
    pub const fn is_locally_administered(&self) -> bool {
        self.0[0] & 0x02 != 0
    }

    pub const fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    /// Random locally-administered unicast address, the shape produced by
    /// MAC randomization on current handsets.
    pub fn random_private<R: Rng>(rng: &mut R) -> Self {
        let mut octets = [0u8; 6];
        rng.fill(&mut octets);
        octets[0] = (octets[0] & 0xFE) | 0x02;
        MacAddr(octets)
    }

    /// Vendor OUI prefix with a random NIC suffix.
    pub fn from_oui<R: Rng>(oui: [u8; 3], rng: &mut R) -> Self {
        let mut octets = [0u8; 6];
        octets[..3].copy_from_slice(&oui);
        rng.fill(&mut octets[3..]);
        MacAddr(octets)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddr({})", self)
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(octets: [u8; 6]) -> Self {
        MacAddr(octets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn private_addresses_are_local_unicast() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..64 {
            let mac = MacAddr::random_private(&mut rng);
            assert!(mac.is_locally_administered());
            assert!(!mac.is_multicast());
        }
    }

    #[test]
    fn oui_prefix_is_preserved() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mac = MacAddr::from_oui([0xFC, 0xFC, 0x48], &mut rng);
        assert_eq!(&mac.octets()[..3], &[0xFC, 0xFC, 0x48]);
    }

    #[test]
    fn displays_as_colon_hex() {
        let mac = MacAddr::new([0x00, 0x11, 0x32, 0xAB, 0xCD, 0xEF]);
        assert_eq!(mac.to_string(), "00:11:32:ab:cd:ef");
    }
}
