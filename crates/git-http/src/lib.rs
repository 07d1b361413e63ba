pub mod advertisement;
pub mod errors;
pub mod handler;
pub mod matcher;
pub mod pktline;
pub mod version;

pub use advertisement::{AdvertisementError, RefAdvertisement, RefRecord};
pub use errors::GitHttpError;
pub use handler::{choose_ref, select_ref, rewrite_advertisement};
pub use matcher::{ForgeMatcher, MatchResult, Matcher};
pub use pktline::{encode_pkt_line, next_pkt_line, PktLine, PktLineError, PKT_FLUSH};
pub use version::Version;
