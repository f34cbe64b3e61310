#[macro_export]
macro_rules! setup_epid {
    ($rng: ident, $setup: ident, $rl_size_range: ident, $sig_rl_range: ident) => {
        // Hardcoding SigRl sizes. This should ideally be taken/updated from command line input
        let $rl_size_range = [0, 1, 10, 50];
        let $setup = test_utils::epid::group_setup(&mut $rng, 1);
        let revoked = $setup
            .member(&mut $rng)
            .0
            .sign_basic(b"revoked", None, &mut $rng)
            .unwrap();
        let $sig_rl_range = $rl_size_range
            .iter()
            .map(|c| {
                let entries = (0..*c).map(|_| &revoked).collect::<Vec<_>>();
                $setup.issuer.sig_rl(1, &entries)
            })
            .collect::<Vec<_>>();
    };
}
