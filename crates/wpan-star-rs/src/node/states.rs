/// Role a node settles into once a network is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Joined an existing coordinator and sends it periodic data.
    Device,
    /// Started the network and accepts associations.
    Coordinator,
}

/// Protocol state, driven exclusively by MAC confirmations, indications,
/// and timer expiries.
///
/// There is no terminal state in normal operation: any unexpected
/// confirmation status routes back through `Resetting`, so an unattended
/// node self-heals instead of stopping. `Halted` is reachable only when a
/// finite reset budget is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Full MAC reset requested, waiting for its confirmation.
    Resetting,
    /// Active scan in flight, looking for a coordinator to join.
    ScanningForNetwork,
    /// Association request sent to the selected coordinator.
    JoiningNetwork,
    /// Setting the PIB attributes required before starting a network.
    FormingNetwork,
    /// Start request issued, waiting for its confirmation.
    StartingNetwork,
    /// Network is up; the node acts in the given role.
    Operational(Role),
    /// Reset budget exhausted; no further requests are issued.
    Halted,
}

impl NodeState {
    pub fn is_operational(self) -> bool {
        matches!(self, NodeState::Operational(_))
    }

    pub fn role(self) -> Option<Role> {
        match self {
            NodeState::Operational(role) => Some(role),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_only_when_operational() {
        assert_eq!(NodeState::Idle.role(), None);
        assert_eq!(NodeState::ScanningForNetwork.role(), None);
        assert_eq!(NodeState::Operational(Role::Device).role(), Some(Role::Device));
        assert!(NodeState::Operational(Role::Coordinator).is_operational());
        assert!(!NodeState::Halted.is_operational());
    }
}
