use ark_std::rand::RngCore;
use epid::{
    file::CaCertificate,
    issuer::{CaSigner, IssuerKey},
    GroupId, GroupPubKey, MemberCtx, PrivKey,
};

/// A CA and one group it issued.
pub struct GroupSetup {
    pub ca: CaSigner,
    pub cert: CaCertificate,
    pub issuer: IssuerKey,
    pub pub_key: GroupPubKey,
}

pub fn group_setup<R: RngCore>(rng: &mut R, gid: u8) -> GroupSetup {
    let ca = CaSigner::new(rng).unwrap();
    let cert = ca.certificate(rng).unwrap();
    let issuer = IssuerKey::new(GroupId([gid; 16]), rng).unwrap();
    let pub_key = issuer.group_pub_key();
    GroupSetup {
        ca,
        cert,
        issuer,
        pub_key,
    }
}

impl GroupSetup {
    pub fn member_key<R: RngCore>(&self, rng: &mut R) -> PrivKey {
        self.issuer.issue_member(rng).unwrap()
    }

    /// A fresh member with its private key.
    pub fn member<R: RngCore>(&self, rng: &mut R) -> (MemberCtx, PrivKey) {
        let key = self.member_key(rng);
        let ctx = MemberCtx::new(self.pub_key.clone(), key.clone(), None).unwrap();
        (ctx, key)
    }

    /// `n` members, each with the given basenames registered.
    pub fn members<R: RngCore>(&self, rng: &mut R, n: usize, basenames: &[&[u8]]) -> Vec<MemberCtx> {
        (0..n)
            .map(|_| {
                let (mut ctx, _) = self.member(rng);
                for bsn in basenames {
                    ctx.register_basename(bsn).unwrap();
                }
                ctx
            })
            .collect()
    }

    /// The group public key as the signed file a verifier would receive.
    pub fn pub_key_file<R: RngCore>(&self, rng: &mut R) -> Vec<u8> {
        self.ca.seal_group_pub_key(&self.pub_key, rng).unwrap()
    }
}
