mod simulation_engine_tests;
