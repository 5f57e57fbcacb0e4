use crate::packet::pid;

/// Membership over the whole 13-bit PID space. Entries are only ever added.
#[derive(Clone)]
pub struct PidSet {
    bits: Box<[bool; pid::COUNT]>,
}

impl PidSet {
    pub fn new() -> Self {
        PidSet {
            bits: Box::new([false; pid::COUNT]),
        }
    }

    pub fn set(&mut self, pid: u16) {
        self.bits[pid as usize & (pid::COUNT - 1)] = true;
    }

    pub fn contains(&self, pid: u16) -> bool {
        self.bits[pid as usize & (pid::COUNT - 1)]
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b)
            .map(|(pid, _)| pid as u16)
    }
}

impl Default for PidSet {
    fn default() -> Self {
        PidSet::new()
    }
}

impl std::fmt::Debug for PidSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl std::iter::FromIterator<u16> for PidSet {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        let mut set = PidSet::new();
        for pid in iter {
            set.set(pid);
        }
        set
    }
}
