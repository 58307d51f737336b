use proptest::prelude::*;

use kt::core::{CommandGuard, SafetyTier};

proptest! {
    #[test]
    fn evaluate_never_panics(input in ".*") {
        let guard = CommandGuard::builtin();
        let _ = guard.evaluate_command(&input);
    }

    #[test]
    fn recursive_forced_removal_is_never_allowed(path in "/[a-z]{1,12}(/[a-z]{1,8}){0,3}") {
        let guard = CommandGuard::builtin();
        let decision = guard.evaluate_command(&format!("rm -rf {path}"));
        prop_assert!(!decision.allowed);
        prop_assert_eq!(decision.tier, SafetyTier::Critical);
    }

    #[test]
    fn read_only_kubectl_is_allowed(resource in "(pods|events|nodes|pvc)", ns in "[a-z]{1,10}") {
        let guard = CommandGuard::builtin();
        let decision = guard.evaluate_command(&format!("kubectl get {resource} -n {ns}"));
        prop_assert!(decision.allowed);
    }
}
