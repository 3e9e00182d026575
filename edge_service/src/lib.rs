use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path as FilePath;
use std::time::Duration;

use riskatlas::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Malformed request: {0}")]
    Request(String),
    #[error(transparent)]
    Risk(#[from] RiskAtlasError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Request(e.to_string())
    }
}

impl ServiceError {
    fn status(&self) -> &'static str {
        match self {
            ServiceError::Request(_) | ServiceError::Risk(RiskAtlasError::InvalidParameter(_)) => {
                "400 Bad Request"
            }
            ServiceError::Risk(RiskAtlasError::DataUnavailable(_)) => "404 Not Found",
            ServiceError::Io(e) if e.kind() == ErrorKind::UnexpectedEof => "400 Bad Request",
            ServiceError::Io(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                "408 Request Timeout"
            }
            _ => "500 Internal Server Error",
        }
    }
}

/// Largest request body accepted by default.
pub const MAX_BODY_BYTES: usize = 64 * 1024;
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Per-request resource caps. Requests above a cap are rejected before any simulation runs.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct ServiceLimits {
    /// Upper bound on path steps (`n`, `num_points`).
    pub max_steps: usize,
    /// Upper bound on Monte Carlo trials (`iterations`, `simulations`).
    pub max_trials: usize,
    pub max_body_bytes: usize,
    pub read_timeout_ms: u64,
}

impl Default for ServiceLimits {
    fn default() -> Self {
        Self {
            max_steps: 100_000,
            max_trials: 1_000_000,
            max_body_bytes: MAX_BODY_BYTES,
            read_timeout_ms: 10_000,
        }
    }
}

impl ServiceLimits {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms.max(1))
    }

    pub fn check(&self, request: &Request) -> std::result::Result<(), ServiceError> {
        let (steps, trials) = match request {
            Request::Wiener { n, .. }
            | Request::Gbm { n, .. }
            | Request::OrnsteinUhlenbeck { n, .. }
            | Request::Vasicek { n, .. } => (*n, 1),
            Request::Option { iterations, .. } | Request::Var { iterations, .. } => {
                (1, *iterations)
            }
            Request::Bond {
                simulations,
                num_points,
                ..
            } => (*num_points, *simulations),
        };
        if steps > self.max_steps {
            return Err(ServiceError::Request(format!(
                "{steps} steps exceed the limit of {}",
                self.max_steps
            )));
        }
        if trials > self.max_trials {
            return Err(ServiceError::Request(format!(
                "{trials} trials exceed the limit of {}",
                self.max_trials
            )));
        }
        Ok(())
    }
}

/// Service settings: the simulation config at the top level plus an optional `limits` object.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct ServiceConfig {
    #[serde(flatten)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub limits: ServiceLimits,
}

impl ServiceConfig {
    pub fn new(simulation: SimulationConfig) -> Self {
        Self {
            simulation,
            limits: ServiceLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ServiceLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ServiceConfig = serde_json::from_str(json)?;
        config.simulation.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<FilePath>>(path: P) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}

/// Calculator request. `seed` overrides the service-wide seed for this request only.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(flatten)]
    pub request: Request,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Request {
    Wiener {
        dt: f64,
        #[serde(default)]
        x0: f64,
        n: usize,
    },
    Gbm {
        s0: f64,
        t: f64,
        n: usize,
        mu: f64,
        sigma: f64,
    },
    OrnsteinUhlenbeck {
        dt: f64,
        theta: f64,
        mu: f64,
        sigma: f64,
        n: usize,
    },
    Vasicek {
        r0: f64,
        kappa: f64,
        theta: f64,
        sigma: f64,
        t: f64,
        n: usize,
    },
    Option {
        spot: f64,
        strike: f64,
        maturity: f64,
        rate: f64,
        volatility: f64,
        option_type: OptionKind,
        iterations: usize,
    },
    Bond {
        face_value: f64,
        r0: f64,
        kappa: f64,
        theta: f64,
        sigma: f64,
        maturity: f64,
        simulations: usize,
        num_points: usize,
    },
    Var {
        position: f64,
        mu: f64,
        sigma: f64,
        confidence: f64,
        days: u32,
        iterations: usize,
    },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Response {
    Path {
        path: Path,
    },
    Option {
        quote: OptionQuote,
        black_scholes: f64,
    },
    Bond {
        quote: BondQuote,
        closed_form: f64,
    },
    Var {
        comparison: VarComparison,
    },
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub fn handle_request(envelope: RequestEnvelope, config: &SimulationConfig) -> Result<Response> {
    let mut config = *config;
    if let Some(seed) = envelope.seed {
        config = config.with_seed(seed);
    }
    let mut rng = seeded_rng(config.seed.unwrap_or_else(entropy_seed));

    let response = match envelope.request {
        Request::Wiener { dt, x0, n } => Response::Path {
            path: simulate_wiener(dt, x0, n, &mut rng)?,
        },
        Request::Gbm { s0, t, n, mu, sigma } => Response::Path {
            path: simulate_gbm(s0, t, n, mu, sigma, &mut rng)?,
        },
        Request::OrnsteinUhlenbeck {
            dt,
            theta,
            mu,
            sigma,
            n,
        } => Response::Path {
            path: simulate_ornstein_uhlenbeck(dt, theta, mu, sigma, n, &mut rng)?,
        },
        Request::Vasicek {
            r0,
            kappa,
            theta,
            sigma,
            t,
            n,
        } => Response::Path {
            path: simulate_vasicek(r0, kappa, theta, sigma, t, n, &mut rng)?,
        },
        Request::Option {
            spot,
            strike,
            maturity,
            rate,
            volatility,
            option_type,
            iterations,
        } => {
            let params =
                OptionParameters::new(spot, strike, maturity, rate, volatility, option_type);
            let aggregator = MonteCarloAggregator::from_config(iterations, &config)?;
            let quote = price_option(&params, &aggregator)?;
            Response::Option {
                quote,
                black_scholes: params.black_scholes_price(),
            }
        }
        Request::Bond {
            face_value,
            r0,
            kappa,
            theta,
            sigma,
            maturity,
            simulations,
            num_points,
        } => {
            let model = VasicekModel::new(r0, kappa, theta, sigma)?;
            let params = VasicekBondParameters::new(face_value, model, maturity, num_points);
            let aggregator = MonteCarloAggregator::from_config(simulations, &config)?;
            let quote = price_bond(&params, &aggregator)?;
            Response::Bond {
                quote,
                closed_form: params.closed_form_price(),
            }
        }
        Request::Var {
            position,
            mu,
            sigma,
            confidence,
            days,
            iterations,
        } => {
            let params = VarParameters::new(position, mu, sigma, confidence, days);
            let aggregator = MonteCarloAggregator::from_config(iterations, &config)?;
            Response::Var {
                comparison: compare_var(&params, &aggregator)?,
            }
        }
    };
    Ok(response)
}

fn read_body<R: Read>(stream: R, max_body_bytes: usize) -> std::result::Result<String, ServiceError> {
    let budget = (MAX_HEADER_BYTES + max_body_bytes) as u64;
    let mut reader = BufReader::new(stream.take(budget));
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(ServiceError::Request("connection closed in headers".to_string()));
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value
                    .trim()
                    .parse()
                    .map_err(|_| ServiceError::Request(format!("bad content length {value}")))?;
            }
        }
    }
    if content_length > max_body_bytes {
        return Err(ServiceError::Request(format!(
            "body of {content_length} bytes exceeds the limit of {max_body_bytes}"
        )));
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;
    String::from_utf8(body).map_err(|e| ServiceError::Request(e.to_string()))
}

fn respond(
    stream: &TcpStream,
    config: &ServiceConfig,
) -> std::result::Result<String, ServiceError> {
    let body = read_body(stream, config.limits.max_body_bytes)?;
    let envelope: RequestEnvelope = serde_json::from_str(&body)?;
    config.limits.check(&envelope.request)?;
    info!(request = ?envelope.request, "handling request");
    let response = handle_request(envelope, &config.simulation)?;
    Ok(serde_json::to_string(&response)?)
}

pub fn handle_connection(mut stream: TcpStream, config: &ServiceConfig) -> std::io::Result<()> {
    stream.set_read_timeout(Some(config.limits.read_timeout()))?;
    stream.set_write_timeout(Some(config.limits.read_timeout()))?;
    let (status, body) = match respond(&stream, config) {
        Ok(body) => ("200 OK", body),
        Err(e) => {
            warn!(error = %e, "request failed");
            let body = serde_json::to_string(&ErrorBody {
                error: e.to_string(),
            })
            .unwrap_or_else(|_| "{}".to_string());
            (e.status(), body)
        }
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes())
}

pub fn serve_listener(listener: TcpListener, config: &ServiceConfig) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "edge service listening");
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                if let Err(e) = handle_connection(stream, config) {
                    warn!(error = %e, "could not write response");
                }
            }
            Err(e) => warn!(error = %e, "connection failed"),
        }
    }
    Ok(())
}

pub fn serve(addr: &str, config: &ServiceConfig) -> std::io::Result<()> {
    serve_listener(TcpListener::bind(addr)?, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::thread;

    fn request(json: &str) -> RequestEnvelope {
        serde_json::from_str(json).unwrap()
    }

    fn config() -> SimulationConfig {
        SimulationConfig::new().with_seed(5)
    }

    #[test]
    fn test_path_requests() {
        let cases = [
            r#"{"kind": "wiener", "dt": 0.1, "n": 10}"#,
            r#"{"kind": "gbm", "s0": 100.0, "t": 1.0, "n": 10, "mu": 0.05, "sigma": 0.2}"#,
            r#"{"kind": "ornstein_uhlenbeck", "dt": 0.1, "theta": 1.0, "mu": 0.5, "sigma": 0.1, "n": 10}"#,
            r#"{"kind": "vasicek", "r0": 0.05, "kappa": 0.3, "theta": 0.06, "sigma": 0.02, "t": 1.0, "n": 10}"#,
        ];
        for case in cases {
            match handle_request(request(case), &config()).unwrap() {
                Response::Path { path } => assert_eq!(path.len(), 11),
                other => panic!("unexpected response {other:?}"),
            }
        }
    }

    #[test]
    fn test_seeded_requests_repeat() {
        let json = r#"{"kind": "gbm", "s0": 100.0, "t": 1.0, "n": 20, "mu": 0.05, "sigma": 0.2, "seed": 9}"#;
        let a = handle_request(request(json), &SimulationConfig::new()).unwrap();
        let b = handle_request(request(json), &SimulationConfig::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_option_bond_and_var() {
        let option = r#"{"kind": "option", "spot": 100.0, "strike": 100.0, "maturity": 1.0,
            "rate": 0.05, "volatility": 0.2, "option_type": "call", "iterations": 20000}"#;
        match handle_request(request(option), &config()).unwrap() {
            Response::Option { quote, black_scholes } => {
                assert!((quote.price - black_scholes).abs() < 4.0 * quote.standard_error + 0.05)
            }
            other => panic!("unexpected response {other:?}"),
        }

        let bond = r#"{"kind": "bond", "face_value": 1000.0, "r0": 0.05, "kappa": 0.3,
            "theta": 0.05, "sigma": 0.01, "maturity": 1.0, "simulations": 500, "num_points": 100}"#;
        match handle_request(request(bond), &config()).unwrap() {
            Response::Bond { quote, closed_form } => {
                assert!((quote.price - closed_form).abs() / closed_form < 0.01)
            }
            other => panic!("unexpected response {other:?}"),
        }

        let var = r#"{"kind": "var", "position": 1000000.0, "mu": 0.0005, "sigma": 0.02,
            "confidence": 0.99, "days": 1, "iterations": 10000}"#;
        match handle_request(request(var), &config()).unwrap() {
            Response::Var { comparison } => assert!(comparison.analytical.loss > 0.0),
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[test]
    fn test_invalid_parameters_are_bad_requests() {
        let json = r#"{"kind": "gbm", "s0": 100.0, "t": 1.0, "n": 10, "mu": 0.05, "sigma": -0.2}"#;
        let err = ServiceError::from(handle_request(request(json), &config()).unwrap_err());
        assert_eq!(err.status(), "400 Bad Request");
        assert!(serde_json::from_str::<RequestEnvelope>(r#"{"kind": "swaption"}"#).is_err());
    }

    #[test]
    fn test_round_trip_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            for _ in 0..2 {
                let (stream, _) = listener.accept().unwrap();
                handle_connection(stream, &ServiceConfig::new(config())).unwrap();
            }
        });

        let send = |body: &str| {
            let mut client = TcpStream::connect(addr).unwrap();
            write!(
                client,
                "POST / HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
                body.len(),
                body
            )
            .unwrap();
            let mut response = String::new();
            client.read_to_string(&mut response).unwrap();
            response
        };

        let ok = send(r#"{"kind": "wiener", "dt": 0.5, "n": 4}"#);
        assert!(ok.starts_with("HTTP/1.1 200 OK"));
        assert!(ok.contains("\"kind\":\"path\""));

        let bad = send(r#"{"kind": "wiener", "dt": 0.5, "n": 0}"#);
        assert!(bad.starts_with("HTTP/1.1 400 Bad Request"));
        assert!(bad.contains("\"error\""));

        server.join().unwrap();
    }

    #[test]
    fn test_oversized_bodies_are_rejected() {
        for length in [usize::MAX, 1 << 40, MAX_BODY_BYTES + 1] {
            let raw = format!("POST / HTTP/1.1\r\nContent-Length: {length}\r\n\r\n{{}}");
            let err = read_body(Cursor::new(raw.into_bytes()), MAX_BODY_BYTES).unwrap_err();
            assert_eq!(err.status(), "400 Bad Request");
        }

        let endless_header = vec![b'a'; 4 * MAX_BODY_BYTES];
        let err = read_body(Cursor::new(endless_header), MAX_BODY_BYTES).unwrap_err();
        assert_eq!(err.status(), "400 Bad Request");

        let raw = "POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\n{}";
        let body = read_body(Cursor::new(raw.as_bytes().to_vec()), MAX_BODY_BYTES).unwrap();
        assert_eq!(body, "{}");
    }

    #[test]
    fn test_request_counts_are_capped() {
        let limits = ServiceLimits::default();
        for json in [
            r#"{"kind": "wiener", "dt": 0.1, "n": 100000000}"#,
            r#"{"kind": "var", "position": 1e6, "mu": 0.0, "sigma": 0.02, "confidence": 0.99, "days": 1, "iterations": 1000000000}"#,
            r#"{"kind": "bond", "face_value": 1000, "r0": 0.1, "kappa": 0.3, "theta": 0.3, "sigma": 0.03, "maturity": 1.0, "simulations": 10, "num_points": 10000000}"#,
        ] {
            let err = limits.check(&request(json).request).unwrap_err();
            assert_eq!(err.status(), "400 Bad Request");
        }
        assert!(limits
            .check(&request(r#"{"kind": "wiener", "dt": 0.1, "n": 1000}"#).request)
            .is_ok());

        let tight = ServiceLimits {
            max_steps: 10,
            ..ServiceLimits::default()
        };
        assert!(tight
            .check(&request(r#"{"kind": "gbm", "s0": 1.0, "t": 1.0, "n": 11, "mu": 0.1, "sigma": 0.2}"#).request)
            .is_err());
    }

    #[test]
    fn test_service_config_reads_limits() {
        let config = ServiceConfig::from_json_str(r#"{"seed": 3, "limits": {"max_steps": 10}}"#).unwrap();
        assert_eq!(config.simulation.seed, Some(3));
        assert_eq!(config.limits.max_steps, 10);
        assert_eq!(config.limits.max_trials, ServiceLimits::default().max_trials);

        let defaults = ServiceConfig::from_json_str("{}").unwrap();
        assert_eq!(defaults.limits, ServiceLimits::default());
    }

    #[test]
    fn test_stalled_client_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let service = ServiceConfig::new(config()).with_limits(ServiceLimits {
            read_timeout_ms: 200,
            ..ServiceLimits::default()
        });
        let server = thread::spawn(move || {
            for _ in 0..2 {
                let (stream, _) = listener.accept().unwrap();
                handle_connection(stream, &service).unwrap();
            }
        });

        let mut stalled = TcpStream::connect(addr).unwrap();
        write!(stalled, "POST / HTTP/1.1\r\nContent-Length: 64\r\n\r\n").unwrap();
        let mut response = String::new();
        stalled.read_to_string(&mut response).unwrap();
        assert!(response.starts_with("HTTP/1.1 408 Request Timeout"));

        let body = r#"{"kind": "wiener", "dt": 0.5, "n": 4}"#;
        let mut client = TcpStream::connect(addr).unwrap();
        write!(
            client,
            "POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        )
        .unwrap();
        let mut ok = String::new();
        client.read_to_string(&mut ok).unwrap();
        assert!(ok.starts_with("HTTP/1.1 200 OK"));

        server.join().unwrap();
    }
}
