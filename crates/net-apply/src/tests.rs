//! Tests for interface shutdown and routing table operations

#[cfg(test)]
mod tests {
    use crate::command::{CommandOutput, Invocation, MockCommandRunner};
    use crate::route::RouteTable;
    use crate::shutdown::{InterfaceShutdown, IFPLUGD_ALREADY_STOPPED};
    use mockall::Sequence;
    use netif_core::{CommandPaths, HostFileSystem, NetDevices, NetworkError, SysPaths};
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const IFPLUGD: &str = "/usr/sbin/ifplugd";
    const IFDOWN: &str = "/sbin/ifdown";

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Temporary `/sys/class/net` with the given interfaces registered
    fn create_test_host(interfaces: &[&str]) -> (TempDir, NetDevices) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let paths = SysPaths::with_root(temp_dir.path());
        for name in interfaces {
            fs::create_dir_all(paths.sys_class_net.join(name)).unwrap();
        }
        (temp_dir, NetDevices::new(HostFileSystem, paths))
    }

    fn test_commands() -> CommandPaths {
        CommandPaths {
            ifplugd: PathBuf::from(IFPLUGD),
            ifplugd_start: vec![
                "/usr/sbin/invoke-rc.d".to_string(),
                "ifplugd".to_string(),
                "start".to_string(),
            ],
            ifdown: PathBuf::from(IFDOWN),
            ip: PathBuf::from("/bin/ip"),
        }
    }

    fn expect_call(
        runner: &mut MockCommandRunner,
        seq: &mut Sequence,
        program: &'static str,
        args: &'static [&'static str],
        exit_code: i32,
    ) {
        runner
            .expect_call()
            .withf(move |invocation: &Invocation| {
                invocation.program == PathBuf::from(program) && invocation.args == args
            })
            .times(1)
            .in_sequence(seq)
            .returning(move |_| Ok(exit_code));
    }

    #[test]
    fn test_force_shutdown_order() {
        init_logging();
        let (_temp_dir, devices) = create_test_host(&["lo", "eth0", "eth0.20", "eth0.10", "eth1"]);

        let mut runner = MockCommandRunner::new();
        let mut seq = Sequence::new();
        expect_call(&mut runner, &mut seq, IFPLUGD, &["-i", "eth0", "-k"], 0);
        expect_call(&mut runner, &mut seq, IFDOWN, &["eth0.10"], 0);
        expect_call(&mut runner, &mut seq, IFDOWN, &["eth0.20"], 0);
        expect_call(&mut runner, &mut seq, IFDOWN, &["eth0"], 0);

        let shutdown = InterfaceShutdown::new(runner, devices, test_commands());
        assert_eq!(
            shutdown.force_shutdown("eth0").unwrap(),
            vec!["eth0.10", "eth0.20", "eth0"]
        );
    }

    #[test]
    fn test_force_shutdown_stops_at_first_failure() {
        init_logging();
        let (_temp_dir, devices) = create_test_host(&["eth0", "eth0.10", "eth0.20"]);

        let mut runner = MockCommandRunner::new();
        let mut seq = Sequence::new();
        expect_call(&mut runner, &mut seq, IFPLUGD, &["-i", "eth0", "-k"], 0);
        expect_call(&mut runner, &mut seq, IFDOWN, &["eth0.10"], 1);

        let shutdown = InterfaceShutdown::new(runner, devices, test_commands());
        let err = shutdown.force_shutdown("eth0").unwrap_err();
        assert!(err.is_network_op());
        assert!(err.to_string().contains("eth0.10"));
    }

    #[test]
    fn test_force_shutdown_ifplugd_already_stopped() {
        init_logging();
        let (_temp_dir, devices) = create_test_host(&["eth1"]);

        let mut runner = MockCommandRunner::new();
        let mut seq = Sequence::new();
        expect_call(
            &mut runner,
            &mut seq,
            IFPLUGD,
            &["-i", "eth1", "-k"],
            IFPLUGD_ALREADY_STOPPED,
        );
        expect_call(&mut runner, &mut seq, IFDOWN, &["eth1"], 0);

        let shutdown = InterfaceShutdown::new(runner, devices, test_commands());
        assert_eq!(shutdown.force_shutdown("eth1").unwrap(), vec!["eth1"]);
    }

    #[test]
    fn test_force_shutdown_ifplugd_failure() {
        init_logging();
        let (_temp_dir, devices) = create_test_host(&["eth0", "eth0.10"]);

        let mut runner = MockCommandRunner::new();
        let mut seq = Sequence::new();
        expect_call(&mut runner, &mut seq, IFPLUGD, &["-i", "eth0", "-k"], 1);

        let shutdown = InterfaceShutdown::new(runner, devices, test_commands());
        let err = shutdown.force_shutdown("eth0").unwrap_err();
        assert!(err.is_network_op());
        assert!(err.to_string().contains("kill instance"));
    }

    #[test]
    fn test_force_shutdown_ifplugd_missing() {
        init_logging();
        let (_temp_dir, devices) = create_test_host(&["eth0"]);

        let mut runner = MockCommandRunner::new();
        runner
            .expect_call()
            .times(1)
            .returning(|_| Err(io::Error::from(io::ErrorKind::NotFound)));

        let shutdown = InterfaceShutdown::new(runner, devices, test_commands());
        let err = shutdown.force_shutdown("eth0").unwrap_err();
        assert!(err.is_network_op());
        assert!(err.to_string().contains("could not invoke ifplugd"));
    }

    #[test]
    fn test_force_shutdown_ifdown_missing() {
        init_logging();
        let (_temp_dir, devices) = create_test_host(&["eth0", "eth0.10"]);

        let mut runner = MockCommandRunner::new();
        let mut seq = Sequence::new();
        expect_call(&mut runner, &mut seq, IFPLUGD, &["-i", "eth0", "-k"], 0);
        runner
            .expect_call()
            .withf(|invocation: &Invocation| invocation.args == ["eth0.10"])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(io::Error::from(io::ErrorKind::PermissionDenied)));

        let shutdown = InterfaceShutdown::new(runner, devices, test_commands());
        let err = shutdown.force_shutdown("eth0").unwrap_err();
        assert!(err.to_string().contains("could not invoke ifdown"));
    }

    #[test]
    fn test_shutdown_set_ignores_other_interfaces() {
        let (_temp_dir, devices) =
            create_test_host(&["eth0", "eth0.100", "eth0.9", "eth01.5", "eth1.3", "vlan4"]);

        let shutdown = InterfaceShutdown::new(MockCommandRunner::new(), devices, test_commands());
        assert_eq!(
            shutdown.shutdown_set("eth0").unwrap(),
            vec!["eth0.9", "eth0.100", "eth0"]
        );
    }

    #[test]
    fn test_start_link_monitor() {
        init_logging();

        for (exit_code, succeeds) in [(0, true), (1, false)] {
            let (_temp_dir, devices) = create_test_host(&[]);
            let mut runner = MockCommandRunner::new();
            let mut seq = Sequence::new();
            expect_call(
                &mut runner,
                &mut seq,
                "/usr/sbin/invoke-rc.d",
                &["ifplugd", "start"],
                exit_code,
            );

            let shutdown = InterfaceShutdown::new(runner, devices, test_commands());
            match shutdown.start_link_monitor() {
                Ok(()) => assert!(succeeds),
                Err(err) => {
                    assert!(!succeeds);
                    assert!(err.is_network_op());
                    assert!(err.to_string().contains("failure of"));
                }
            }
        }
    }

    #[test]
    fn test_start_link_monitor_spawn_failure() {
        let (_temp_dir, devices) = create_test_host(&[]);

        let mut runner = MockCommandRunner::new();
        runner
            .expect_call()
            .returning(|_| Err(io::Error::from(io::ErrorKind::NotFound)));

        let shutdown = InterfaceShutdown::new(runner, devices, test_commands());
        assert!(shutdown.start_link_monitor().unwrap_err().is_network_op());
    }

    #[test]
    fn test_route_commands() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_capture()
            .withf(|invocation: &Invocation| {
                invocation.program == PathBuf::from("/bin/ip")
                    && invocation.args
                        == [
                            "route",
                            "add",
                            "10.0.0.0/24",
                            "via",
                            "192.168.1.1",
                            "dev",
                            "eth0",
                        ]
            })
            .times(1)
            .returning(|_| {
                Ok(CommandOutput {
                    exit_code: 0,
                    output: String::new(),
                })
            });
        runner
            .expect_capture()
            .withf(|invocation: &Invocation| {
                invocation.args
                    == [
                        "route",
                        "del",
                        "10.0.0.0/255.255.255.0",
                        "via",
                        "192.168.1.1",
                        "dev",
                        "eth0",
                    ]
            })
            .times(1)
            .returning(|_| {
                Ok(CommandOutput {
                    exit_code: 2,
                    output: "RTNETLINK answers: No such process\n".to_string(),
                })
            });
        runner
            .expect_capture()
            .withf(|invocation: &Invocation| invocation.args == ["route", "flush"])
            .times(1)
            .returning(|_| {
                Ok(CommandOutput {
                    exit_code: 0,
                    output: String::new(),
                })
            });
        runner
            .expect_capture()
            .withf(|invocation: &Invocation| invocation.args == ["route", "flush", "cache"])
            .times(1)
            .returning(|_| {
                Ok(CommandOutput {
                    exit_code: 0,
                    output: String::new(),
                })
            });

        let routes = RouteTable::new(runner, "/bin/ip");
        assert!(routes
            .route_set("10.0.0.0", "24", "192.168.1.1", "eth0")
            .unwrap()
            .success());

        // Exit codes are reported, not turned into errors
        let output = routes
            .route_unset("10.0.0.0", "255.255.255.0", "192.168.1.1", "eth0")
            .unwrap();
        assert_eq!(output.exit_code, 2);
        assert!(output.output.contains("No such process"));

        assert!(routes.route_flush().unwrap().success());
        assert!(routes.route_flush_cache().unwrap().success());
    }

    #[test]
    fn test_route_list() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_capture()
            .withf(|invocation: &Invocation| invocation.args == ["route", "list"])
            .times(1)
            .returning(|_| {
                Ok(CommandOutput {
                    exit_code: 0,
                    output: "\
default via 192.168.1.254 dev eth0
10.0.0.0/24 via 192.168.1.1 dev eth0
10.1.0.1 via 192.168.1.1 dev eth0
192.168.1.0/24 dev eth0 proto kernel scope link src 192.168.1.10
"
                    .to_string(),
                })
            });

        let routes = RouteTable::new(runner, "/bin/ip").route_list().unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].destination, "10.0.0.0");
        assert_eq!(routes[0].prefix_length, 24);
        assert_eq!(routes[1].destination, "10.1.0.1");
        assert_eq!(routes[1].prefix_length, 32);
        assert_eq!(routes[1].gateway, "192.168.1.1");
    }

    #[test]
    fn test_route_spawn_failure() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_capture()
            .returning(|_| Err(io::Error::from(io::ErrorKind::NotFound)));

        let err = RouteTable::new(runner, "/bin/ip").route_flush().unwrap_err();
        assert!(matches!(
            err,
            NetworkError::System(netif_core::error::SystemError::CommandSpawn { .. })
        ));
    }
}
