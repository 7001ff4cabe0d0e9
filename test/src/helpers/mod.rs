pub mod assertions;
pub mod test_peers;

pub use assertions::{assert_mirrored, mirror_of};
pub use packet_exchange::{exchange_packets, exchange_packets_n_times};
pub use test_peers::TestPeers;
