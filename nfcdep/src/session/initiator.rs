// nfcdep-rs/nfcdep/src/session/initiator.rs

//! Initiator role machine.
//!
//! The Initiator owns the conversation: every frame it sends expects exactly
//! one answer, so every suspension is a `SendAndWait` with a deadline.
//! Recovery follows the retry supervisor: timeouts are probed with ATN and
//! then retransmitted, broken frames are answered with NACK and sequence
//! errors are retransmitted.

use derive_more::Display;
use log::{debug, warn};

use crate::constants::{CMD_DEP_REQ, CMD_DSL_REQ, CMD_RLS_REQ, CMD_TYPE_REQ, CMD_WUP_REQ};
use crate::protocol::commands::Command;
use crate::protocol::dep::DepPdu;
use crate::protocol::params::{self, BitRates};
use crate::protocol::pfb::PduKind;
use crate::protocol::responses::Response;
use crate::session::config::InitiatorConfig;
use crate::session::context::{Context, DeviceInfo, RoleData};
use crate::session::exchange::RxProgress;
use crate::session::supervisor::RetryKind;
use crate::session::{activation, psl};
use crate::session::{Deactivation, DeactivationCheck, Event, NoDeactivation, Step};
use crate::types::{CommMode, Did, Pni};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InitiatorState {
    Idle,
    Activating,
    BitRateNegotiating,
    ExchangeIdle,
    Transmitting,
    Receiving,
    AttentionProbing,
    Disconnecting,
    Releasing,
    WakingUp,
}

/// Why an ATN is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// Caller asked whether the Target is still there
    Presence,
    /// A response timed out; resume in the given state once ATN is answered
    Recovery(InitiatorState),
}

pub struct Initiator {
    config: InitiatorConfig,
    state: InitiatorState,
    ctx: Option<Context>,
    /// Context of a deselected Target, kept for WUP in active mode
    sleeping: Option<Context>,
    cancel: Box<dyn DeactivationCheck + Send>,
    proposed_did: Did,
    last_did: Did,
    pending_rates: Option<BitRates>,
    probe: Option<Probe>,
    awaiting_data: bool,
    ack_pending: bool,
    tx_chain_open: bool,
}

fn session_mut(ctx: &mut Option<Context>) -> Result<&mut Context> {
    ctx.as_mut().ok_or_else(|| Error::InvalidState {
        operation: "step",
        state: "no session".into(),
    })
}

impl Initiator {
    pub fn new(config: InitiatorConfig) -> Self {
        Self {
            config,
            state: InitiatorState::Idle,
            ctx: None,
            sleeping: None,
            cancel: Box::new(NoDeactivation),
            proposed_did: Did::NONE,
            last_did: Did::NONE,
            pending_rates: None,
            probe: None,
            awaiting_data: false,
            ack_pending: false,
            tx_chain_open: false,
        }
    }

    pub fn with_deactivation_check<C>(mut self, check: C) -> Self
    where
        C: DeactivationCheck + Send + 'static,
    {
        self.cancel = Box::new(check);
        self
    }

    pub fn set_deactivation_check<C>(&mut self, check: C)
    where
        C: DeactivationCheck + Send + 'static,
    {
        self.cancel = Box::new(check);
    }

    pub fn state(&self) -> InitiatorState {
        self.state
    }

    pub fn config(&self) -> &InitiatorConfig {
        &self.config
    }

    pub fn context(&self) -> Option<&Context> {
        self.ctx.as_ref()
    }

    pub fn device_info(&self) -> Option<&DeviceInfo> {
        self.ctx.as_ref().map(|c| &c.info)
    }

    pub fn retry_count(&self, kind: RetryKind) -> u8 {
        self.ctx
            .as_ref()
            .map_or(0, |c| c.supervisor.count(kind))
    }

    /// Everything received since the last `send`, chained parts included.
    pub fn take_received(&mut self) -> Vec<u8> {
        self.ctx
            .as_mut()
            .map(|c| c.rx.take())
            .unwrap_or_default()
    }

    /// Build ATR_REQ and start activation.
    pub fn start(&mut self) -> Result<Step> {
        self.require(&[InitiatorState::Idle], "start")?;
        self.config.validate()?;

        let did = if self.config.did.is_keep() {
            self.last_did
        } else {
            self.config.did
        };
        let req = activation::build_atr_req(&self.config, did);
        let info = DeviceInfo::new(self.config.lr, 0, did, self.config.bit_rate);
        let mut ctx = Context::new(
            self.config.comm_mode,
            self.config.oper,
            self.config.limits,
            info,
            self.config.max_rx_len,
            self.config.bit_rate,
            RoleData::Initiator { atr_res: None },
        );
        let frame = ctx.frame(&req.encode())?;

        self.ctx = Some(ctx);
        self.sleeping = None;
        self.proposed_did = did;
        self.set_state(InitiatorState::Activating);
        Ok(Step::SendAndWait {
            frame,
            timeout: Some(params::activation_timeout()),
        })
    }

    /// Queue `payload` and send its first chunk. With `more` the message is
    /// left open and the machine answers `NeedData` once everything supplied
    /// so far is acknowledged.
    pub fn send(&mut self, payload: &[u8], more: bool) -> Result<Step> {
        let resuming = self.state == InitiatorState::Transmitting && self.awaiting_data;
        if self.state != InitiatorState::ExchangeIdle && !resuming {
            return Err(self.invalid_state("send"));
        }
        let ctx = session_mut(&mut self.ctx)?;
        if payload.is_empty() && !more && !ctx.oper.empty_pdu_allowed {
            return Err(Error::InvalidParameter(
                "empty information PDUs are disabled".into(),
            ));
        }
        if !resuming {
            ctx.rx.clear();
            self.tx_chain_open = false;
        }
        ctx.tx.push(payload, more);
        self.awaiting_data = false;
        self.transmit_next()
    }

    /// Check that the Target still answers. Needs ATN to be enabled.
    pub fn probe_presence(&mut self) -> Result<Step> {
        self.require(&[InitiatorState::ExchangeIdle], "probe_presence")?;
        let ctx = session_mut(&mut self.ctx)?;
        if !ctx.oper.atn_enabled {
            return Err(Error::InvalidParameter("ATN is disabled".into()));
        }
        ctx.supervisor.reset();
        self.probe = Some(Probe::Presence);
        self.set_state(InitiatorState::AttentionProbing);
        self.send_attention()
    }

    /// Send DSL or RLS.
    pub fn deactivate(&mut self, kind: Deactivation) -> Result<Step> {
        let waiting_for_data = self.state == InitiatorState::Transmitting && self.awaiting_data;
        if self.state != InitiatorState::ExchangeIdle && !waiting_for_data {
            return Err(self.invalid_state("deactivate"));
        }
        let ctx = session_mut(&mut self.ctx)?;
        let did = ctx.info.did.active();
        let cmd = match kind {
            Deactivation::Disconnect => Command::Dsl { did },
            Deactivation::Release => Command::Rls { did },
        };
        let frame = ctx.frame(&cmd.encode())?;
        ctx.supervisor.reset();
        let timeout = ctx.supervisor.response_timeout();

        self.awaiting_data = false;
        self.set_state(match kind {
            Deactivation::Disconnect => InitiatorState::Disconnecting,
            Deactivation::Release => InitiatorState::Releasing,
        });
        Ok(Step::SendAndWait {
            frame,
            timeout: Some(timeout),
        })
    }

    /// Wake a deselected Target with WUP_REQ (active mode only).
    pub fn wake_up(&mut self) -> Result<Step> {
        self.require(&[InitiatorState::Idle], "wake_up")?;
        if self.config.comm_mode != CommMode::Active {
            return Err(Error::InvalidParameter(
                "WUP is only used in active mode".into(),
            ));
        }
        let mut ctx = self.sleeping.take().ok_or_else(|| Error::InvalidState {
            operation: "wake_up",
            state: "no deselected target".into(),
        })?;
        let nfcid3 = match &ctx.role {
            RoleData::Initiator {
                atr_res: Some(res),
            } => res.nfcid3,
            _ => {
                return Err(Error::InvalidState {
                    operation: "wake_up",
                    state: "target never activated".into(),
                });
            }
        };
        let did = ctx.info.did.active().unwrap_or(0);
        let frame = ctx.frame(&Command::Wup { nfcid3, did }.encode())?;
        ctx.supervisor.reset();
        let timeout = ctx.supervisor.response_timeout();

        self.ctx = Some(ctx);
        self.set_state(InitiatorState::WakingUp);
        Ok(Step::SendAndWait {
            frame,
            timeout: Some(timeout),
        })
    }

    /// Advance the machine. Fatal errors drop the session and leave the
    /// machine in `Idle`.
    pub fn step(&mut self, event: Event) -> Result<Step> {
        if self.state == InitiatorState::Idle {
            return Err(self.invalid_state("step"));
        }
        if event == Event::DeactivationRequested || self.cancel.is_pending() {
            return Ok(self.cancel_session());
        }

        let outcome = match self.state {
            InitiatorState::Activating => self.on_activating(event),
            InitiatorState::BitRateNegotiating => self.on_bit_rate(event),
            InitiatorState::ExchangeIdle => match event {
                Event::Continue => Ok(Step::Complete),
                _ => Err(self.invalid_state("step")),
            },
            InitiatorState::Transmitting | InitiatorState::Receiving => self.on_exchange(event),
            InitiatorState::AttentionProbing => self.on_attention(event),
            InitiatorState::Disconnecting
            | InitiatorState::Releasing
            | InitiatorState::WakingUp => self.on_control(event),
            InitiatorState::Idle => Err(self.invalid_state("step")),
        };

        match outcome {
            Err(e @ Error::InvalidState { .. }) => Err(e),
            Err(e) => {
                warn!("initiator: {} in state {}, session dropped", e, self.state);
                self.reset_to_idle();
                Err(e)
            }
            ok => ok,
        }
    }

    fn on_activating(&mut self, event: Event) -> Result<Step> {
        match event {
            Event::Received(frame) => {
                let ctx = session_mut(&mut self.ctx)?;
                let body = ctx.unframe(&frame)?;
                let (res, info) =
                    activation::handle_atr_res(&self.config, self.proposed_did, &body)?;
                ctx.info = info;
                ctx.supervisor.set_rwt(info.rwt);
                ctx.supervisor.reset();
                ctx.role = RoleData::Initiator { atr_res: Some(res) };
                self.last_did = info.did;

                match self.config.psl.rates() {
                    Some(wanted) => {
                        let (body, rates) = psl::build_psl_req(info.did, wanted.to_brs(), info.lr)?;
                        let frame = ctx.frame(&body)?;
                        let timeout = ctx.supervisor.response_timeout();
                        self.pending_rates = Some(rates);
                        self.set_state(InitiatorState::BitRateNegotiating);
                        Ok(Step::SendAndWait {
                            frame,
                            timeout: Some(timeout),
                        })
                    }
                    None => {
                        self.set_state(InitiatorState::ExchangeIdle);
                        Ok(Step::Complete)
                    }
                }
            }
            Event::Timeout => self.resend_last(RetryKind::Timeout),
            Event::TransmissionError => self.resend_last(RetryKind::Retransmit),
            _ => Err(self.invalid_state("step")),
        }
    }

    fn on_bit_rate(&mut self, event: Event) -> Result<Step> {
        match event {
            Event::Received(frame) => {
                let ctx = session_mut(&mut self.ctx)?;
                let body = ctx.unframe(&frame)?;
                psl::handle_psl_res(ctx.info.did, &body)?;
                let rates = self.pending_rates.take().ok_or_else(|| Error::InvalidState {
                    operation: "step",
                    state: "no bit rate requested".into(),
                })?;
                ctx.switch_bit_rate(rates);
                ctx.supervisor.reset();
                debug!("initiator: bit rate now {} / {}", rates.dsi, rates.dri);
                self.set_state(InitiatorState::ExchangeIdle);
                Ok(Step::SwitchBitRate(rates))
            }
            // no fallback to the previous rate
            Event::Timeout => Err(Error::Timeout),
            Event::TransmissionError => Err(Error::TransmissionError),
            _ => Err(self.invalid_state("step")),
        }
    }

    fn on_exchange(&mut self, event: Event) -> Result<Step> {
        match event {
            Event::Received(_) if self.ack_pending || self.awaiting_data => {
                Err(self.invalid_state("step"))
            }
            Event::Received(frame) => self.on_dep_response(&frame),
            Event::Timeout => self.on_response_timeout(),
            Event::TransmissionError => self.on_broken_response(),
            Event::Continue if self.ack_pending => self.send_ack(),
            Event::Continue if self.awaiting_data => Ok(Step::NeedData),
            _ => Err(self.invalid_state("step")),
        }
    }

    fn decode_dep(&mut self, frame: &[u8]) -> Result<Option<DepPdu>> {
        let ctx = session_mut(&mut self.ctx)?;
        let dep_ctx = ctx.dep_context();
        let decoded = ctx
            .unframe(frame)
            .and_then(|body| Response::decode(CMD_DEP_REQ, &body, &dep_ctx));
        match decoded {
            Ok(Response::Dep(pdu)) => Ok(Some(pdu)),
            Ok(other) => Err(Error::ProtocolViolation(format!(
                "response {:#04x} to DEP_REQ",
                other.response_code()
            ))),
            Err(e) if e.is_malformed() => {
                warn!("initiator: broken response: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn on_dep_response(&mut self, frame: &[u8]) -> Result<Step> {
        let Some(pdu) = self.decode_dep(frame)? else {
            return self.on_broken_response();
        };
        if pdu.kind == PduKind::TimeoutExtension {
            return self.on_rtox(&pdu);
        }

        let state = self.state;
        let ctx = session_mut(&mut self.ctx)?;
        match pdu.kind {
            PduKind::Ack if state == InitiatorState::Transmitting => {
                if pdu.pni != ctx.pni {
                    return self.on_sequence_error(pdu.pni);
                }
                ctx.pni = ctx.pni.next();
                ctx.supervisor.reset();
                ctx.supervisor.clear_extension();
                ctx.tx.acknowledge();
                self.transmit_next()
            }
            PduKind::Information { chaining } if state == InitiatorState::Receiving => {
                if pdu.pni != ctx.pni {
                    return self.on_sequence_error(pdu.pni);
                }
                ctx.pni = ctx.pni.next();
                ctx.supervisor.reset();
                ctx.supervisor.clear_extension();
                ctx.tx.acknowledge();
                match ctx.rx.push(&pdu.payload, chaining)? {
                    RxProgress::MorePending => {
                        self.ack_pending = true;
                        Ok(Step::ChunkAvailable)
                    }
                    RxProgress::Complete => {
                        debug!("initiator: received {} bytes", ctx.rx.len());
                        self.tx_chain_open = false;
                        self.set_state(InitiatorState::ExchangeIdle);
                        Ok(Step::Complete)
                    }
                }
            }
            kind => Err(Error::ProtocolViolation(format!(
                "{:?} PDU from target in state {}",
                kind, state
            ))),
        }
    }

    fn on_rtox(&mut self, pdu: &DepPdu) -> Result<Step> {
        let ctx = session_mut(&mut self.ctx)?;
        if !ctx.oper.rtox_enabled {
            return Err(Error::ProtocolViolation(
                "RTOX request while RTOX is disabled".into(),
            ));
        }
        let rtox = pdu.rtox().unwrap_or(0);
        let timeout = ctx.supervisor.extend(rtox)?;
        debug!("initiator: RTOX {}, waiting {} 1/fc", rtox, timeout);
        let reply = DepPdu::timeout_extension(rtox).with_did(ctx.info.did.active());
        let frame = ctx.frame_once(&reply.encode(CMD_TYPE_REQ, CMD_DEP_REQ))?;
        Ok(Step::SendAndWait {
            frame,
            timeout: Some(timeout),
        })
    }

    /// Wrong PNI: the Target missed or repeated something.
    fn on_sequence_error(&mut self, got: Pni) -> Result<Step> {
        if let Some(ctx) = self.ctx.as_ref() {
            warn!(
                "initiator: PNI {} received, {} expected",
                got, ctx.pni
            );
        }
        self.resend_last(RetryKind::Nack)
    }

    fn on_response_timeout(&mut self) -> Result<Step> {
        let ctx = session_mut(&mut self.ctx)?;
        ctx.supervisor.record(RetryKind::Timeout)?;
        ctx.supervisor.clear_extension();
        if ctx.oper.atn_enabled {
            self.probe = Some(Probe::Recovery(self.state));
            self.set_state(InitiatorState::AttentionProbing);
            self.send_attention()
        } else {
            self.resend_last(RetryKind::Retransmit)
        }
    }

    /// Transmission error or undecodable response.
    fn on_broken_response(&mut self) -> Result<Step> {
        let probing = self.state == InitiatorState::AttentionProbing;
        let kind = match self.probe {
            Some(Probe::Presence) if probing => RetryKind::Attention,
            _ => RetryKind::Nack,
        };
        let ctx = session_mut(&mut self.ctx)?;
        ctx.supervisor.record(kind)?;
        if probing {
            return self.send_attention();
        }
        let nack = DepPdu::nack(ctx.pni).with_did(ctx.info.did.active());
        let frame = ctx.frame_once(&nack.encode(CMD_TYPE_REQ, CMD_DEP_REQ))?;
        Ok(Step::SendAndWait {
            frame,
            timeout: Some(ctx.supervisor.response_timeout()),
        })
    }

    fn on_attention(&mut self, event: Event) -> Result<Step> {
        match event {
            Event::Received(frame) => {
                let Some(pdu) = self.decode_dep(&frame)? else {
                    return self.on_broken_response();
                };
                match pdu.kind {
                    PduKind::Attention => self.on_attention_answered(),
                    PduKind::TimeoutExtension => self.on_rtox(&pdu),
                    other => {
                        warn!("initiator: {:?} PDU while waiting for ATN", other);
                        self.on_broken_response()
                    }
                }
            }
            Event::Timeout => {
                let ctx = session_mut(&mut self.ctx)?;
                ctx.supervisor.record(RetryKind::Attention)?;
                self.send_attention()
            }
            Event::TransmissionError => self.on_broken_response(),
            _ => Err(self.invalid_state("step")),
        }
    }

    fn on_attention_answered(&mut self) -> Result<Step> {
        match self.probe.take() {
            Some(Probe::Recovery(resume)) => {
                debug!("initiator: target present, retransmitting");
                self.set_state(resume);
                self.resend_last(RetryKind::Retransmit)
            }
            Some(Probe::Presence) | None => {
                let ctx = session_mut(&mut self.ctx)?;
                ctx.supervisor.reset();
                self.set_state(InitiatorState::ExchangeIdle);
                Ok(Step::Complete)
            }
        }
    }

    /// DSL, RLS and WUP answers.
    fn on_control(&mut self, event: Event) -> Result<Step> {
        let (cmd, operation) = match self.state {
            InitiatorState::Disconnecting => (CMD_DSL_REQ, Some(Deactivation::Disconnect)),
            InitiatorState::Releasing => (CMD_RLS_REQ, Some(Deactivation::Release)),
            _ => (CMD_WUP_REQ, None),
        };
        match event {
            Event::Received(frame) => {
                let ctx = session_mut(&mut self.ctx)?;
                let dep_ctx = ctx.dep_context();
                let decoded = ctx
                    .unframe(&frame)
                    .and_then(|body| Response::decode(cmd, &body, &dep_ctx));
                match decoded {
                    Ok(Response::Wup { did }) => {
                        let expected = ctx.info.did.active().unwrap_or(0);
                        if did != expected {
                            return Err(Error::NegotiationMismatch(format!(
                                "WUP_RES DID {} for session DID {}",
                                did, expected
                            )));
                        }
                        ctx.pni = Pni::new(0);
                        ctx.rx.clear();
                        ctx.tx.clear();
                        debug!("initiator: target woken up");
                        self.set_state(InitiatorState::ExchangeIdle);
                        Ok(Step::Complete)
                    }
                    Ok(_) => match operation {
                        Some(kind) => Ok(self.finish_deactivation(kind)),
                        None => Err(Error::ProtocolViolation("unexpected WUP answer".into())),
                    },
                    Err(e) if e.is_malformed() => {
                        warn!("initiator: broken {} answer: {}", self.state, e);
                        self.resend_last(RetryKind::Nack)
                    }
                    Err(e) => Err(e),
                }
            }
            Event::Timeout => self.resend_last(RetryKind::Timeout),
            Event::TransmissionError => self.resend_last(RetryKind::Nack),
            _ => Err(self.invalid_state("step")),
        }
    }

    fn finish_deactivation(&mut self, kind: Deactivation) -> Step {
        debug!("initiator: {} complete", kind);
        let ctx = self.ctx.take();
        self.reset_to_idle();
        if kind == Deactivation::Disconnect && self.config.comm_mode == CommMode::Active {
            self.sleeping = ctx;
        }
        Step::Deactivated(kind)
    }

    fn transmit_next(&mut self) -> Result<Step> {
        let ctx = session_mut(&mut self.ctx)?;
        let with_nad = !self.tx_chain_open && ctx.info.nad_agreed;
        let max_inf = ctx.info.max_inf(with_nad);
        let Some(chunk) = ctx.tx.next_chunk(max_inf) else {
            self.awaiting_data = true;
            self.set_state(InitiatorState::Transmitting);
            return Ok(Step::NeedData);
        };

        let mut pdu = DepPdu::information(ctx.pni, chunk.chaining, chunk.payload)
            .with_did(ctx.info.did.active());
        if with_nad {
            pdu = pdu.with_nad(ctx.info.nad);
        }
        let frame = ctx.frame(&pdu.encode(CMD_TYPE_REQ, CMD_DEP_REQ))?;
        let timeout = ctx.supervisor.response_timeout();

        self.tx_chain_open = chunk.chaining;
        self.set_state(if chunk.chaining {
            InitiatorState::Transmitting
        } else {
            InitiatorState::Receiving
        });
        Ok(Step::SendAndWait {
            frame,
            timeout: Some(timeout),
        })
    }

    fn send_ack(&mut self) -> Result<Step> {
        let ctx = session_mut(&mut self.ctx)?;
        let ack = DepPdu::ack(ctx.pni).with_did(ctx.info.did.active());
        let frame = ctx.frame(&ack.encode(CMD_TYPE_REQ, CMD_DEP_REQ))?;
        self.ack_pending = false;
        Ok(Step::SendAndWait {
            frame,
            timeout: Some(ctx.supervisor.response_timeout()),
        })
    }

    fn send_attention(&mut self) -> Result<Step> {
        let ctx = session_mut(&mut self.ctx)?;
        let atn = DepPdu::attention().with_did(ctx.info.did.active());
        let frame = ctx.frame_once(&atn.encode(CMD_TYPE_REQ, CMD_DEP_REQ))?;
        Ok(Step::SendAndWait {
            frame,
            timeout: Some(ctx.supervisor.response_timeout()),
        })
    }

    /// Count the event, then send the last frame again.
    fn resend_last(&mut self, kind: RetryKind) -> Result<Step> {
        let activating = self.state == InitiatorState::Activating;
        let ctx = session_mut(&mut self.ctx)?;
        ctx.supervisor.record(kind)?;
        let frame = ctx.last_frame.clone().ok_or_else(|| Error::InvalidState {
            operation: "retransmit",
            state: "nothing sent yet".into(),
        })?;
        let timeout = if activating {
            params::activation_timeout()
        } else {
            ctx.supervisor.response_timeout()
        };
        Ok(Step::SendAndWait {
            frame,
            timeout: Some(timeout),
        })
    }

    fn cancel_session(&mut self) -> Step {
        debug!("initiator: deactivation pending in state {}", self.state);
        self.reset_to_idle();
        Step::Cancelled
    }

    fn reset_to_idle(&mut self) {
        self.ctx = None;
        self.pending_rates = None;
        self.probe = None;
        self.awaiting_data = false;
        self.ack_pending = false;
        self.tx_chain_open = false;
        self.set_state(InitiatorState::Idle);
    }

    fn set_state(&mut self, next: InitiatorState) {
        if self.state != next {
            debug!("initiator: {} -> {}", self.state, next);
            self.state = next;
        }
    }

    fn require(&self, allowed: &[InitiatorState], operation: &'static str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(self.invalid_state(operation))
        }
    }

    fn invalid_state(&self, operation: &'static str) -> Error {
        Error::InvalidState {
            operation,
            state: self.state.to_string(),
        }
    }
}
