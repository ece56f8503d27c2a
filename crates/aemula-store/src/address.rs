//! Local content address computation.
//!
//! Local backends mint CIDv1 addresses with the `raw` codec over a SHA2-256
//! multihash, the same form an IPFS node produces for a single raw block.

use aemula_core::ContentAddress;
use cid::Cid;
use multihash_codetable::{Code, MultihashDigest};

/// Multicodec code for raw binary.
const RAW_CODEC: u64 = 0x55;

/// Compute the CIDv1 (raw, sha2-256, base32) of a blob.
pub fn compute_cid(blob: &[u8]) -> ContentAddress {
    let hash = Code::Sha2_256.digest(blob);
    ContentAddress::new(Cid::new_v1(RAW_CODEC, hash).to_string())
}

/// Hex-encoded SHA2-256 digest of a blob.
pub fn digest_hex(blob: &[u8]) -> String {
    hex::encode(Code::Sha2_256.digest(blob).digest())
}
