//! Uniform random host selection.

use rand::seq::SliceRandom;

use crate::load_balancer::LoadBalancer;

/// Picks any configured host with equal probability. Hosts are not health
/// checked.
#[derive(Debug, Default, Clone, Copy)]
pub struct Random;

impl Random {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for Random {
    fn next_host<'a>(&self, hosts: &'a [String]) -> Option<&'a str> {
        hosts.choose(&mut rand::thread_rng()).map(String::as_str)
    }
}
