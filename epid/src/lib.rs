#![cfg_attr(not(feature = "std"), no_std)]

//! # EPID 2.0 group signatures
//!
//! Anonymous attestation over the BLS12-381 pairing groups. A group issuer hands each member a
//! private key `(A, x, f)` certified under the group public key `(h1, h2, w)`. Members then sign
//! messages as "some member of the group" without revealing which one, and verifiers check those
//! signatures against four kinds of revocation list:
//!
//! - [`rl::PrivRl`], private keys that have leaked,
//! - [`rl::SigRl`], signatures whose (anonymous) signer is revoked; every signature carries a
//!   non-revocation proof per entry,
//! - [`rl::GroupRl`], whole groups,
//! - [`rl::VerifierRl`], signers a verifier blacklisted under one of its basenames.
//!
//! Signatures made under the same basename by the same member are linkable (they share `K`),
//! signatures made without one are not.
//!
//! The main entry points are [`member::MemberCtx`] and [`verifier::VerifierCtx`]. Keys and lists
//! produced by an issuer arrive in files signed by the issuing CA; see [`file`] for the framing and
//! [`issuer`] for the producing side.
//!
//! ```ignore
//! let mut member = MemberCtx::new(pub_key.clone(), priv_key, None)?;
//! let sig = member.sign(b"hello", None, Some(&sig_rl), &mut rng)?;
//!
//! let mut verifier = VerifierCtx::new(pub_key, None)?;
//! verifier.set_sig_rl(&sig_rl)?;
//! verifier.verify(&sig, b"hello")?;
//! ```

extern crate alloc;

pub mod ct;
pub mod error;
pub mod file;
pub mod groups;
pub mod hash;
pub mod issuer;
pub mod keys;
pub mod member;
pub mod precomp;
pub mod rl;
pub mod signature;
pub mod verifier;

pub use error::EpidError;
pub use hash::HashAlg;
pub use keys::{
    is_priv_key_in_group, parse_group_pub_key_file, parse_priv_key, CompressedPrivKey, GroupId,
    GroupPubKey, MemberKey, PrivKey,
};
pub use member::MemberCtx;
pub use rl::{GroupRl, PrivRl, SigRl, SigRlEntry, VerifierRl};
pub use signature::{are_sigs_linked, sig_size, BasicSignature, NrProof, Signature};
pub use verifier::VerifierCtx;
