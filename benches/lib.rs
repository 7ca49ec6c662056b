#![feature(test)]

extern crate test;

use httpstub::{Method, NestedBuilder, Server, StubCommand};
use std::fmt::Display;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use test::Bencher;

/// Sends `route` and reads back the status line only.
fn status_line(host: impl Display, route: &str) -> String {
    let mut stream = TcpStream::connect(host.to_string()).unwrap();
    write!(stream, "{} HTTP/1.1\r\nconnection: close\r\n\r\n", route).unwrap();

    let mut reader = BufReader::new(stream);
    let mut status_line = String::new();
    reader.read_line(&mut status_line).unwrap();

    status_line
}

fn hello() -> StubCommand {
    StubCommand::builder()
        .request()
        .method(Method::GET)
        .path("/")
        .and()
        .response()
        .body("test")
        .and()
        .build()
}

#[bench]
fn bench_register_simple_stub(b: &mut Bencher) {
    let s = Server::new();
    let command = hello();

    b.iter(|| {
        command.register(&s).unwrap();
    })
}

#[bench]
fn bench_match_simple_stub(b: &mut Bencher) {
    let s = Server::new();
    hello().register(&s).unwrap();

    b.iter(|| {
        let status_line = status_line(s.host_with_port(), "GET /");
        assert!(status_line.starts_with("HTTP/1.1 200"));
    })
}
