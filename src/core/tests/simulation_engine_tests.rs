// Tests for SimulationEngine functionality
#[cfg(test)]
mod tests {
    use crate::core::{
        actors::CustomerOutcome,
        errors::SimError,
        events::{EventKind, TurnAwayReason},
        execution::config::SimulationConfig,
        execution::simulation_engine::SimulationEngine,
        schedule::Schedule,
        types::Role,
    };
    use std::time::Duration;

    fn config() -> SimulationConfig {
        SimulationConfig::default().with_time_scale(Duration::ZERO)
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let result = SimulationEngine::new(config().with_tables(0), Schedule::default());
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_schedule_opens_and_closes() {
        let report = SimulationEngine::new(config(), Schedule::default())
            .unwrap()
            .run()
            .unwrap();

        assert!(report.customers.is_empty());
        assert_eq!(report.waiters.len(), 5);
        assert_eq!(report.cooks.len(), 2);
        assert_eq!(report.free_tables, 10);
        assert_eq!(report.final_time, 0);

        let ready = report.events.iter().filter(|e| e.kind == EventKind::Ready).count();
        let shifts = report.events.iter().filter(|e| e.kind == EventKind::ShiftEnded).count();
        let cooks = report.events.iter().filter(|e| e.kind == EventKind::CookLeaving).count();
        assert_eq!((ready, shifts, cooks), (7, 5, 2));
    }

    #[test]
    fn test_staff_are_ready_before_first_customer() {
        let schedule = Schedule::from_records(&[(1, 0, 1)]).unwrap();
        let report = SimulationEngine::new(config(), schedule).unwrap().run().unwrap();

        let first_customer_event = report
            .events
            .iter()
            .position(|e| matches!(e.actor, Role::Customer(_)))
            .unwrap();
        assert!(report.events[..first_customer_event]
            .iter()
            .all(|e| e.kind == EventKind::Ready));
        assert_eq!(first_customer_event, 7);
    }

    #[test]
    fn test_run_id_is_carried_into_report() {
        let engine = SimulationEngine::new(config(), Schedule::default()).unwrap();
        let run_id = engine.run_id();
        assert_eq!(engine.run().unwrap().run_id, run_id);
    }

    #[test]
    fn test_late_and_served_customers_in_one_run() {
        // Paced, so the late arrival cannot move the clock before customer 1 is done.
        let paced = config().with_time_scale(Duration::from_millis(2));
        let schedule = Schedule::from_records(&[(1, 0, 1), (2, 241, 4)]).unwrap();
        let report = SimulationEngine::new(paced, schedule).unwrap().run().unwrap();

        assert_eq!(report.served(), 1);
        assert_eq!(report.turned_away(TurnAwayReason::LateArrival), 1);
        assert!(matches!(
            report.customers[0].outcome,
            CustomerOutcome::Departed { waiting_time: 6, departed_at: 36, .. }
        ));
        assert_eq!(report.free_tables, 10);
    }
}
