//! 端到端会话测试：真实 TCP 套接字 + 假云台
//!
//! 假云台实现协议的最小服务端：回应 284 模式查询，对 519 转向
//! 先回 `ret:1` 再回 `ret:0`（双重确认），531 停跟踪不回应。

use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Sender, unbounded};
use polaris_client::{
    GotoOutcome, MountSession, ResponseCorrelator, SessionConfig, SessionState,
    response_reader_loop,
};

/// 最小假云台：处理一个连接，记录收到的完整命令
fn spawn_fake_mount(seen_commands: Sender<String>) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut buf = String::new();
        let mut chunk = [0u8; 256];
        loop {
            let n = match stream.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            buf.push_str(&String::from_utf8_lossy(&chunk[..n]));

            while let Some(end) = buf.find('#') {
                let command: String = buf.drain(..=end).collect();
                let _ = seen_commands.send(command.clone());

                if command.contains("&284&") {
                    stream.write_all(b"284@mode:8;track:1;#").expect("write 284");
                } else if command.contains("&519&") {
                    // 双重确认，第二条才是最终结果
                    stream.write_all(b"519@ret:1;#").expect("write first ack");
                    thread::sleep(Duration::from_millis(10));
                    stream.write_all(b"519@ret:0;#").expect("write second ack");
                }
                // 531 等 fire-and-forget 命令不回应
            }
        }
    });

    port
}

#[test]
fn initialize_and_goto_over_tcp() {
    let (cmd_tx, cmd_rx) = unbounded();
    let port = spawn_fake_mount(cmd_tx);

    let stream = TcpStream::connect(("127.0.0.1", port)).expect("connect");
    let shutdown_handle = stream.try_clone().expect("clone for shutdown");
    let correlator = ResponseCorrelator::new();

    let reader_stream = stream.try_clone().expect("clone stream");
    let reader_correlator = correlator.clone();
    let reader = thread::spawn(move || {
        response_reader_loop(reader_stream, reader_correlator);
    });

    let mut session = MountSession::new(
        stream,
        correlator,
        SessionConfig {
            latitude_deg: 44.42,
            longitude_deg: 5.12,
            response_timeout: Duration::from_secs(5),
        },
    );

    session.initialize().expect("initialize");
    assert_eq!(session.state(), SessionState::Ready);

    let outcome = session.goto(350.0, 20.0, true).expect("goto");
    match outcome {
        GotoOutcome::Completed(fields) => {
            assert_eq!(fields.get("ret").map(String::as_str), Some("0"));
        },
        other => panic!("expected Completed, got {other:?}"),
    }
    assert_eq!(session.state(), SessionState::Ready);

    // 读取线程持有套接字的克隆，drop 会话不足以关闭连接；
    // 显式 shutdown 让假云台与读取线程都看到 EOF
    shutdown_handle
        .shutdown(Shutdown::Both)
        .expect("shutdown stream");
    drop(session);
    reader.join().expect("reader thread");

    let commands: Vec<String> = cmd_rx.try_iter().collect();
    assert!(commands[0].contains("1&284&2&-1"), "commands={commands:?}");
    // goto 先停跟踪再转向；350° 方位角换算成偏航 10°
    let stop_idx = commands.iter().position(|c| c.contains("&531&")).unwrap();
    let slew_idx = commands.iter().position(|c| c.contains("&519&")).unwrap();
    assert!(stop_idx < slew_idx);
    assert!(commands[slew_idx].contains("yaw:10.00000;"));
    assert!(commands[slew_idx].contains("pitch:20.00000;"));
    assert!(commands[slew_idx].contains("lat:44.42000;"));
    assert!(commands[slew_idx].contains("lng:5.12000;"));
}
