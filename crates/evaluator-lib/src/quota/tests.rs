//! Scenario tests for headroom computation
//!
//! These tests walk through create and edit flows against small synthetic
//! clusters with and without namespace quotas.

#[cfg(test)]
mod headroom_scenarios {
    use crate::models::{
        DataAccessPolicy, DeploymentRequest, DeploymentType, NamespaceQuota, NodeCapacity,
        SavedReservation,
    };
    use crate::quota::{
        reservation_exceeds_headroom, QuotaEvaluator, QuotaPolicy, DEFAULT_CPU_FLOOR,
        DEFAULT_MEMORY_FLOOR_MB,
    };

    /// Two nodes totalling 8 cores and 16 GB
    fn cluster() -> Vec<NodeCapacity> {
        vec![
            NodeCapacity::parse("worker-1", 4.0, "8G").unwrap(),
            NodeCapacity::parse("worker-2", 4.0, "8G").unwrap(),
        ]
    }

    fn request(replicas: u32, cpu: f64, memory_mb: u64) -> DeploymentRequest {
        DeploymentRequest::new(
            DeploymentType::Replicated,
            DataAccessPolicy::Shared,
            replicas,
            cpu,
            memory_mb,
        )
        .unwrap()
    }

    #[test]
    fn test_no_quota_uses_cluster_totals() {
        let nodes = vec![
            NodeCapacity::parse("a", 2.5, "3Gi").unwrap(),
            NodeCapacity::parse("b", 1.25, "1Gi").unwrap(),
        ];
        let headroom = QuotaEvaluator::default().compute_headroom(&nodes, None, None);

        assert_eq!(headroom.cpu.min, 0.0);
        assert_eq!(headroom.cpu.max, 3.75);
        assert_eq!(headroom.memory_mb.min, 0);
        // 4 GiB floored to decimal megabytes
        assert_eq!(headroom.memory_mb.max, 4_294);
        assert!(!headroom.quota_applied);
    }

    #[test]
    fn test_quota_limit_minus_used() {
        let quota = NamespaceQuota::new(Some(4.0), 1.5, None, 0).unwrap();
        let headroom = QuotaEvaluator::default().compute_headroom(&cluster(), Some(&quota), None);

        assert_eq!(headroom.cpu.min, DEFAULT_CPU_FLOOR);
        assert_eq!(headroom.cpu.max, 2.5);
        assert!(headroom.quota_applied);
    }

    #[test]
    fn test_mixed_quota_scenario() {
        // 8 CPU / 16 GB cluster, CPU-only quota of 4 with 1 used
        let quota = NamespaceQuota::new(Some(4.0), 1.0, None, 0).unwrap();
        let headroom = QuotaEvaluator::default().compute_headroom(&cluster(), Some(&quota), None);

        assert_eq!(headroom.cpu.min, DEFAULT_CPU_FLOOR);
        assert_eq!(headroom.cpu.max, 3.0);
        assert_eq!(headroom.memory_mb.min, 0);
        assert_eq!(headroom.memory_mb.max, 16_000);
    }

    #[test]
    fn test_memory_quota() {
        let quota = NamespaceQuota::new(None, 0.0, Some(8_000_000_000), 2_000_000_000).unwrap();
        let headroom = QuotaEvaluator::default().compute_headroom(&cluster(), Some(&quota), None);

        assert_eq!(headroom.cpu.min, 0.0);
        assert_eq!(headroom.cpu.max, 8.0);
        assert_eq!(headroom.memory_mb.min, DEFAULT_MEMORY_FLOOR_MB);
        assert_eq!(headroom.memory_mb.max, 6_000);
    }

    #[test]
    fn test_edit_credits_saved_reservation() {
        let quota = NamespaceQuota::new(Some(4.0), 3.0, Some(8_000_000_000), 6_000_000_000).unwrap();
        let saved = SavedReservation::new(0.5, 512, 3).unwrap();
        let evaluator = QuotaEvaluator::default();

        let without = evaluator.compute_headroom(&cluster(), Some(&quota), None);
        let with = evaluator.compute_headroom(&cluster(), Some(&quota), Some(&saved));

        assert_eq!(without.cpu.max, 1.0);
        assert_eq!(with.cpu.max, without.cpu.max + 0.5 * 3.0);
        assert_eq!(without.memory_mb.max, 2_000);
        assert_eq!(with.memory_mb.max, 2_000 + 512 * 3);
    }

    #[test]
    fn test_saved_reservation_ignored_without_quota() {
        let saved = SavedReservation::new(1.0, 1024, 2).unwrap();
        let headroom = QuotaEvaluator::default().compute_headroom(&cluster(), None, Some(&saved));

        assert_eq!(headroom.cpu.max, 8.0);
        assert_eq!(headroom.memory_mb.max, 16_000);
    }

    #[test]
    fn test_zero_saved_limit_not_credited() {
        let quota = NamespaceQuota::new(Some(2.0), 1.0, None, 0).unwrap();
        let saved = SavedReservation::new(0.0, 0, 4).unwrap();
        let headroom =
            QuotaEvaluator::default().compute_headroom(&cluster(), Some(&quota), Some(&saved));

        assert_eq!(headroom.cpu.max, 1.0);
    }

    #[test]
    fn test_overused_quota_saturates_at_zero() {
        let quota = NamespaceQuota::new(Some(2.0), 3.0, Some(1_000_000_000), 2_000_000_000).unwrap();
        let headroom = QuotaEvaluator::default().compute_headroom(&cluster(), Some(&quota), None);

        assert_eq!(headroom.cpu.max, 0.0);
        assert_eq!(headroom.memory_mb.max, 0);
        assert!(headroom.is_capacity_exhausted());
    }

    #[test]
    fn test_overused_quota_recovers_with_credit() {
        let quota = NamespaceQuota::new(Some(2.0), 3.0, Some(1_000_000_000), 2_000_000_000).unwrap();
        let saved = SavedReservation::new(1.0, 1000, 2).unwrap();
        let headroom =
            QuotaEvaluator::default().compute_headroom(&cluster(), Some(&quota), Some(&saved));

        assert_eq!(headroom.cpu.max, 1.0);
        assert_eq!(headroom.memory_mb.max, 1_000);
        assert!(!headroom.is_capacity_exhausted());
    }

    #[test]
    fn test_cpu_max_rounded_to_two_decimals() {
        let quota = NamespaceQuota::new(Some(1.0), 0.333, None, 0).unwrap();
        let headroom = QuotaEvaluator::default().compute_headroom(&cluster(), Some(&quota), None);
        assert_eq!(headroom.cpu.max, 0.67);
    }

    #[test]
    fn test_memory_max_floored_to_megabytes() {
        let nodes = vec![NodeCapacity::new("a", 1.0, 1_999_999).unwrap()];
        let headroom = QuotaEvaluator::default().compute_headroom(&nodes, None, None);
        assert_eq!(headroom.memory_mb.max, 1);
    }

    #[test]
    fn test_custom_policy_floors() {
        let evaluator = QuotaEvaluator::new(QuotaPolicy {
            cpu_floor: 0.25,
            memory_floor_mb: 128,
        });
        let quota = NamespaceQuota::new(Some(4.0), 0.0, Some(4_000_000_000), 0).unwrap();
        let headroom = evaluator.compute_headroom(&cluster(), Some(&quota), None);

        assert_eq!(headroom.cpu.min, 0.25);
        assert_eq!(headroom.memory_mb.min, 128);
    }

    #[test]
    fn test_clamp_snaps_to_min() {
        let quota = NamespaceQuota::new(Some(4.0), 1.0, Some(8_000_000_000), 0).unwrap();
        let headroom = QuotaEvaluator::default().compute_headroom(&cluster(), Some(&quota), None);

        let clamped = headroom.clamp_request(&request(1, 5.0, 32));
        assert_eq!(clamped.cpu_limit_per_replica(), DEFAULT_CPU_FLOOR);
        assert_eq!(clamped.memory_limit_per_replica_mb(), DEFAULT_MEMORY_FLOOR_MB);

        let untouched = headroom.clamp_request(&request(2, 1.5, 256));
        assert_eq!(untouched, request(2, 1.5, 256));
    }

    #[test]
    fn test_overflow_detection() {
        let quota = NamespaceQuota::new(Some(2.5), 0.0, Some(2_000_000_000), 0).unwrap();
        let headroom = QuotaEvaluator::default().compute_headroom(&cluster(), Some(&quota), None);

        assert!(reservation_exceeds_headroom(&request(3, 1.0, 128), &headroom));
        assert!(!reservation_exceeds_headroom(&request(2, 1.25, 128), &headroom));
        assert!(reservation_exceeds_headroom(&request(4, 0.1, 512), &headroom));
        assert!(!reservation_exceeds_headroom(&request(4, 0.1, 500), &headroom));
    }

    #[test]
    fn test_overflow_ignores_float_noise() {
        let quota = NamespaceQuota::new(Some(0.3), 0.0, None, 0).unwrap();
        let headroom = QuotaEvaluator::default().compute_headroom(&cluster(), Some(&quota), None);

        assert_eq!(headroom.cpu.max, 0.3);
        assert!(!reservation_exceeds_headroom(&request(3, 0.1, 0), &headroom));
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let quota = NamespaceQuota::new(Some(4.0), 1.0, None, 0).unwrap();
        let evaluator = QuotaEvaluator::default();
        let first = evaluator.compute_headroom(&cluster(), Some(&quota), None);
        let second = evaluator.compute_headroom(&cluster(), Some(&quota), None);
        assert_eq!(first, second);
    }
}
