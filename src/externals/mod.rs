pub mod host_telemetry;
