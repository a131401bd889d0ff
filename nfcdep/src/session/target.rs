// nfcdep-rs/nfcdep/src/session/target.rs

//! Target role machine.
//!
//! The Target only ever answers. It has no deadline of its own while
//! waiting for a request, and broken frames are dropped: recovery is driven
//! by the Initiator. A request that arrives again with the previous PNI gets
//! the previous answer again, so data is never delivered twice.

use derive_more::Display;
use log::{debug, warn};

use crate::constants::{CMD_DEP_RES, CMD_TYPE_RES};
use crate::protocol::commands::{AtrReq, Command};
use crate::protocol::dep::DepPdu;
use crate::protocol::pfb::PduKind;
use crate::protocol::responses::{AtrRes, Response};
use crate::protocol::Frame;
use crate::session::config::TargetConfig;
use crate::session::context::{self, Context, DeviceInfo, RoleData};
use crate::session::exchange::RxProgress;
use crate::session::supervisor::RetryKind;
use crate::session::{activation, psl};
use crate::session::{AfterSend, Deactivation, DeactivationCheck, Event, NoDeactivation, Step};
use crate::types::{CommMode, Pni};
use crate::utils::HexDump;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TargetState {
    Idle,
    AwaitingActivation,
    AwaitingConfirmation,
    ExchangeIdle,
    Receiving,
    TimeoutExtensionPending,
    Transmitting,
    Sleeping,
}

pub struct Target {
    config: TargetConfig,
    state: TargetState,
    ctx: Option<Context>,
    cancel: Box<dyn DeactivationCheck + Send>,
    /// A complete request was delivered and the caller owes the answer
    response_due: bool,
    awaiting_data: bool,
    awaiting_ack: bool,
    ack_pending: bool,
    tx_chain_open: bool,
}

fn session_mut(ctx: &mut Option<Context>) -> Result<&mut Context> {
    ctx.as_mut().ok_or_else(|| Error::InvalidState {
        operation: "step",
        state: "no session".into(),
    })
}

const KEEP_LISTENING: Step = Step::Wait { timeout: None };

impl Target {
    pub fn new(config: TargetConfig) -> Self {
        Self {
            config,
            state: TargetState::Idle,
            ctx: None,
            cancel: Box::new(NoDeactivation),
            response_due: false,
            awaiting_data: false,
            awaiting_ack: false,
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

    pub fn state(&self) -> TargetState {
        self.state
    }

    pub fn config(&self) -> &TargetConfig {
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

    /// How long the caller may take for its answer before stepping
    /// `Event::Timeout`, in 1/fc. `None` when no answer is owed.
    pub fn rtox_deadline(&self) -> Option<u32> {
        if !self.answer_owed() {
            return None;
        }
        self.ctx.as_ref().map(|c| c.supervisor.rtox_deadline())
    }

    pub fn take_received(&mut self) -> Vec<u8> {
        self.ctx
            .as_mut()
            .map(|c| c.rx.take())
            .unwrap_or_default()
    }

    /// Wait for ATR_REQ.
    pub fn listen(&mut self) -> Result<Step> {
        if self.state != TargetState::Idle {
            return Err(self.invalid_state("listen"));
        }
        self.config.validate()?;
        self.set_state(TargetState::AwaitingActivation);
        Ok(KEEP_LISTENING)
    }

    /// Start from an ATR_REQ frame the anticollision layer already received.
    pub fn start_with_request(&mut self, frame: &[u8]) -> Result<Step> {
        self.listen()?;
        self.step(Event::Received(frame.to_vec()))
    }

    /// Supply the answer to the request just delivered. With `more` the
    /// answer stays open and `NeedData` is returned once it is all sent.
    pub fn respond(&mut self, payload: &[u8], more: bool) -> Result<Step> {
        let rtox_pending = self.state == TargetState::TimeoutExtensionPending;
        let owed = self.state == TargetState::Transmitting && (self.response_due || self.awaiting_data);
        if !owed && !rtox_pending {
            return Err(self.invalid_state("respond"));
        }
        let ctx = session_mut(&mut self.ctx)?;
        if payload.is_empty() && !more && !ctx.oper.empty_pdu_allowed {
            return Err(Error::InvalidParameter(
                "empty information PDUs are disabled".into(),
            ));
        }
        ctx.tx.push(payload, more);
        self.response_due = false;
        self.awaiting_data = false;

        if rtox_pending {
            // sent once the Initiator echoed the RTOX request
            if let RoleData::Target { pending_tx, .. } = &mut ctx.role {
                *pending_tx = true;
            }
            return Ok(KEEP_LISTENING);
        }
        self.transmit_next()
    }

    pub fn step(&mut self, event: Event) -> Result<Step> {
        if self.state == TargetState::Idle {
            return Err(self.invalid_state("step"));
        }
        if event == Event::DeactivationRequested || self.cancel.is_pending() {
            debug!("target: deactivation pending in state {}", self.state);
            self.reset_to_idle();
            return Ok(Step::Cancelled);
        }

        let outcome = match self.state {
            TargetState::AwaitingActivation => Ok(self.on_listening(event)),
            TargetState::Sleeping => self.on_sleeping(event),
            TargetState::TimeoutExtensionPending => self.on_rtox_pending(event),
            TargetState::AwaitingConfirmation
            | TargetState::ExchangeIdle
            | TargetState::Receiving
            | TargetState::Transmitting => self.on_active(event),
            TargetState::Idle => Err(self.invalid_state("step")),
        };

        match outcome {
            Err(e @ Error::InvalidState { .. }) => Err(e),
            Err(e) => {
                warn!("target: {} in state {}, session dropped", e, self.state);
                self.reset_to_idle();
                Err(e)
            }
            ok => ok,
        }
    }

    fn on_listening(&mut self, event: Event) -> Step {
        match event {
            Event::Received(frame) => match self.try_activate(&frame) {
                Ok(step) => step,
                Err(e) => {
                    warn!("target: ignoring frame while listening: {}", e);
                    KEEP_LISTENING
                }
            },
            _ => KEEP_LISTENING,
        }
    }

    fn try_activate(&mut self, frame: &[u8]) -> Result<Step> {
        let accepted = self.accept_atr(frame)?;
        self.activate_with(accepted)
    }

    /// Validate an ATR_REQ frame without touching the session.
    fn accept_atr(&self, frame: &[u8]) -> Result<(AtrReq, AtrRes, DeviceInfo)> {
        let start_byte = context::uses_start_byte(self.config.comm_mode, self.config.bit_rate);
        log::trace!("RX {}", HexDump(frame));
        let body = Frame::decode(frame, start_byte)?;
        activation::handle_atr_req(&self.config, &body)
    }

    fn activate_with(&mut self, accepted: (AtrReq, AtrRes, DeviceInfo)) -> Result<Step> {
        let (req, res, info) = accepted;
        let mut ctx = Context::new(
            self.config.comm_mode,
            self.config.oper,
            self.config.limits,
            info,
            self.config.max_rx_len,
            self.config.bit_rate,
            RoleData::Target {
                atr_req: req,
                pending_tx: false,
            },
        );
        let frame = ctx.frame(&res.encode())?;

        self.ctx = Some(ctx);
        self.clear_flags();
        self.set_state(TargetState::AwaitingConfirmation);
        Ok(Step::SendOnly {
            frame,
            then: AfterSend::Listen,
        })
    }

    fn on_sleeping(&mut self, event: Event) -> Result<Step> {
        let Event::Received(frame) = event else {
            return Ok(KEEP_LISTENING);
        };
        // reselected by anticollision: the old session is gone and the
        // Target listens again before taking this ATR_REQ
        if let Ok(accepted) = self.accept_atr(&frame) {
            self.ctx = None;
            self.clear_flags();
            self.set_state(TargetState::AwaitingActivation);
            return self.activate_with(accepted);
        }
        if self.config.comm_mode != CommMode::Active {
            return Ok(KEEP_LISTENING);
        }

        let own_nfcid3 = self.config.nfcid3;
        let ctx = session_mut(&mut self.ctx)?;
        let dep_ctx = ctx.dep_context();
        let decoded = ctx
            .unframe(&frame)
            .and_then(|body| Command::decode(&body, &dep_ctx));
        let expected_did = ctx.info.did.active().unwrap_or(0);
        match decoded {
            Ok(Command::Wup { nfcid3, did }) if nfcid3 == own_nfcid3 && did == expected_did => {
                ctx.pni = Pni::new(0);
                ctx.rx.clear();
                ctx.tx.clear();
                ctx.supervisor.reset();
                let frame = ctx.frame(&Response::Wup { did }.encode())?;
                debug!("target: woken up");
                self.clear_flags();
                self.set_state(TargetState::AwaitingConfirmation);
                Ok(Step::SendOnly {
                    frame,
                    then: AfterSend::Listen,
                })
            }
            _ => Ok(KEEP_LISTENING),
        }
    }

    fn on_active(&mut self, event: Event) -> Result<Step> {
        match event {
            Event::Received(frame) => self.on_request(&frame),
            Event::Timeout if self.answer_owed() => self.request_more_time(),
            Event::Continue if self.ack_pending => self.send_ack(),
            Event::Continue if self.awaiting_data || self.response_due => Ok(Step::NeedData),
            Event::Timeout | Event::TransmissionError => Ok(KEEP_LISTENING),
            _ => Err(self.invalid_state("step")),
        }
    }

    /// The application still has to supply (the rest of) an answer.
    fn answer_owed(&self) -> bool {
        self.response_due || (self.awaiting_data && self.state == TargetState::Transmitting)
    }

    /// True while a request has been taken in but not yet answered.
    fn holds_request(&self) -> bool {
        self.response_due
            || self.ack_pending
            || self.state == TargetState::TimeoutExtensionPending
            || self.pending_tx()
    }

    fn pending_tx(&self) -> bool {
        matches!(
            self.ctx.as_ref().map(|c| &c.role),
            Some(RoleData::Target {
                pending_tx: true,
                ..
            })
        )
    }

    fn on_request(&mut self, frame: &[u8]) -> Result<Step> {
        let state = self.state;
        let ctx = session_mut(&mut self.ctx)?;
        let dep_ctx = ctx.dep_context();
        let decoded = ctx
            .unframe(frame)
            .and_then(|body| Command::decode(&body, &dep_ctx).map(|cmd| (cmd, body)));
        let (cmd, body) = match decoded {
            Ok(v) => v,
            Err(e) => {
                warn!("target: ignoring broken frame: {}", e);
                return Ok(KEEP_LISTENING);
            }
        };

        match cmd {
            Command::Dep(pdu) => self.on_dep_request(pdu),
            Command::Atr(_) if state == TargetState::AwaitingConfirmation => {
                debug!("target: ATR_REQ repeated");
                Ok(self.on_listening(Event::Received(frame.to_vec())))
            }
            Command::Psl { .. } if state == TargetState::AwaitingConfirmation => {
                let (rates, fsl, res) = match psl::handle_psl_req(ctx.info.did, &body) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!("target: ignoring PSL_REQ: {}", e);
                        return Ok(KEEP_LISTENING);
                    }
                };
                // PSL_RES still goes out at the old rate
                let frame = ctx.frame(&res)?;
                ctx.switch_bit_rate(rates);
                ctx.info.lr = std::cmp::min(ctx.info.lr, fsl);
                ctx.info.fs = ctx.info.lr.frame_size();
                Ok(Step::SendOnly {
                    frame,
                    then: AfterSend::SwitchBitRate(rates),
                })
            }
            Command::Dsl { did } => {
                let frame = ctx.frame(&Response::Dsl { did }.encode())?;
                ctx.rx.clear();
                ctx.tx.clear();
                self.clear_flags();
                self.set_state(TargetState::Sleeping);
                Ok(Step::SendOnly {
                    frame,
                    then: AfterSend::Deactivated(Deactivation::Disconnect),
                })
            }
            Command::Rls { did } => {
                let frame = ctx.frame_once(&Response::Rls { did }.encode())?;
                self.reset_to_idle();
                Ok(Step::SendOnly {
                    frame,
                    then: AfterSend::Deactivated(Deactivation::Release),
                })
            }
            other => {
                warn!(
                    "target: ignoring request {:#04x} in state {}",
                    other.command_code(),
                    state
                );
                Ok(KEEP_LISTENING)
            }
        }
    }

    fn on_dep_request(&mut self, pdu: DepPdu) -> Result<Step> {
        let state = self.state;
        if state == TargetState::AwaitingConfirmation {
            if pdu.pni != Pni::new(0) {
                warn!("target: first DEP_REQ carries PNI {}", pdu.pni);
                return Ok(KEEP_LISTENING);
            }
            debug!("target: activation confirmed");
            self.set_state(TargetState::ExchangeIdle);
        }
        let holds_request = self.holds_request();
        let awaiting_ack = self.awaiting_ack;

        let ctx = session_mut(&mut self.ctx)?;
        match pdu.kind {
            PduKind::Information { chaining } => {
                if holds_request && pdu.pni == ctx.pni {
                    debug!("target: request repeated while still being processed");
                    return Ok(KEEP_LISTENING);
                }
                if pdu.pni != ctx.pni {
                    return self.repeat_response(pdu.pni);
                }
                if awaiting_ack {
                    return Err(Error::ProtocolViolation(
                        "information PDU while a chained answer waits for ACK".into(),
                    ));
                }
                ctx.supervisor.reset();
                if ctx.rx.at_chain_start() {
                    ctx.info.nad = pdu.nad;
                }
                match ctx.rx.push(&pdu.payload, chaining)? {
                    RxProgress::MorePending => {
                        self.ack_pending = true;
                        self.set_state(TargetState::Receiving);
                        Ok(Step::ChunkAvailable)
                    }
                    RxProgress::Complete => {
                        debug!("target: request of {} bytes", ctx.rx.len());
                        self.response_due = true;
                        self.tx_chain_open = false;
                        self.set_state(TargetState::Transmitting);
                        Ok(Step::Complete)
                    }
                }
            }
            PduKind::Ack => {
                if pdu.pni != ctx.pni {
                    return self.repeat_response(pdu.pni);
                }
                if !awaiting_ack {
                    warn!("target: ACK without a chained answer");
                    return Ok(KEEP_LISTENING);
                }
                ctx.supervisor.reset();
                ctx.tx.acknowledge();
                self.awaiting_ack = false;
                self.transmit_next()
            }
            PduKind::Nack => {
                ctx.supervisor.record(RetryKind::Nack)?;
                Ok(self.resend_last())
            }
            PduKind::Attention => {
                // answering is not a recovery; the Initiator counts its own ATNs
                let atn = DepPdu::attention().with_did(ctx.info.did.active());
                let frame = ctx.frame_once(&atn.encode(CMD_TYPE_RES, CMD_DEP_RES))?;
                Ok(Step::SendOnly {
                    frame,
                    then: AfterSend::Listen,
                })
            }
            PduKind::TimeoutExtension => {
                warn!("target: RTOX echo without a request");
                Ok(KEEP_LISTENING)
            }
        }
    }

    /// Duplicate or out of sequence request: repeat the last answer as is.
    fn repeat_response(&mut self, got: Pni) -> Result<Step> {
        let ctx = session_mut(&mut self.ctx)?;
        warn!(
            "target: PNI {} received, {} expected; repeating last answer",
            got, ctx.pni
        );
        ctx.supervisor.record(RetryKind::Nack)?;
        Ok(self.resend_last())
    }

    fn resend_last(&self) -> Step {
        match self.ctx.as_ref().and_then(|c| c.last_frame.clone()) {
            Some(frame) => Step::SendOnly {
                frame,
                then: AfterSend::Listen,
            },
            None => KEEP_LISTENING,
        }
    }

    fn request_more_time(&mut self) -> Result<Step> {
        let rtox = self.config.rtox;
        let ctx = session_mut(&mut self.ctx)?;
        if !ctx.oper.rtox_enabled {
            warn!("target: answer late and RTOX disabled");
            return Ok(Step::NeedData);
        }
        ctx.supervisor.record(RetryKind::Rtox)?;
        let req = DepPdu::timeout_extension(rtox).with_did(ctx.info.did.active());
        let frame = ctx.frame_once(&req.encode(CMD_TYPE_RES, CMD_DEP_RES))?;
        debug!("target: asking for RTOX {}", rtox);
        self.set_state(TargetState::TimeoutExtensionPending);
        Ok(Step::SendAndWait {
            frame,
            timeout: None,
        })
    }

    fn on_rtox_pending(&mut self, event: Event) -> Result<Step> {
        match event {
            Event::Received(frame) => {
                let ctx = session_mut(&mut self.ctx)?;
                let dep_ctx = ctx.dep_context();
                let decoded = ctx
                    .unframe(&frame)
                    .and_then(|body| Command::decode(&body, &dep_ctx));
                match decoded {
                    Ok(Command::Dep(pdu)) if pdu.kind == PduKind::TimeoutExtension => {
                        self.on_rtox_echo(&pdu)
                    }
                    _ => self.on_request(&frame),
                }
            }
            Event::Timeout => {
                if !self.awaiting_data {
                    self.response_due = true;
                }
                self.request_more_time()
            }
            Event::Continue if !self.pending_tx() => Ok(Step::NeedData),
            Event::TransmissionError | Event::Continue => Ok(KEEP_LISTENING),
            Event::DeactivationRequested => Err(self.invalid_state("step")),
        }
    }

    fn on_rtox_echo(&mut self, pdu: &DepPdu) -> Result<Step> {
        let sent = self.config.rtox;
        let ctx = session_mut(&mut self.ctx)?;
        if pdu.rtox() != Some(sent) {
            return Err(Error::ProtocolViolation(format!(
                "RTOX echo {:?} for request {}",
                pdu.rtox(),
                sent
            )));
        }
        ctx.supervisor.set_extension(sent);
        let answer_ready = match &mut ctx.role {
            RoleData::Target { pending_tx, .. } => std::mem::replace(pending_tx, false),
            RoleData::Initiator { .. } => false,
        };
        if answer_ready {
            self.response_due = false;
            self.transmit_next()
        } else {
            // a chained answer waiting for its next part keeps `awaiting_data`
            if !self.awaiting_data {
                self.response_due = true;
            }
            self.set_state(TargetState::Transmitting);
            Ok(Step::NeedData)
        }
    }

    fn transmit_next(&mut self) -> Result<Step> {
        let ctx = session_mut(&mut self.ctx)?;
        let with_nad = !self.tx_chain_open && ctx.info.nad.is_some();
        let max_inf = ctx.info.max_inf(with_nad);
        let Some(chunk) = ctx.tx.next_chunk(max_inf) else {
            self.awaiting_data = true;
            self.set_state(TargetState::Transmitting);
            return Ok(Step::NeedData);
        };

        let mut pdu = DepPdu::information(ctx.pni, chunk.chaining, chunk.payload)
            .with_did(ctx.info.did.active());
        if with_nad {
            pdu = pdu.with_nad(ctx.info.nad);
        }
        let frame = ctx.frame(&pdu.encode(CMD_TYPE_RES, CMD_DEP_RES))?;
        ctx.pni = ctx.pni.next();
        ctx.supervisor.clear_extension();
        if !chunk.chaining {
            ctx.tx.acknowledge();
        }

        self.tx_chain_open = chunk.chaining;
        self.awaiting_ack = chunk.chaining;
        self.set_state(if chunk.chaining {
            TargetState::Transmitting
        } else {
            TargetState::ExchangeIdle
        });
        Ok(Step::SendOnly {
            frame,
            then: AfterSend::Listen,
        })
    }

    fn send_ack(&mut self) -> Result<Step> {
        let ctx = session_mut(&mut self.ctx)?;
        let ack = DepPdu::ack(ctx.pni).with_did(ctx.info.did.active());
        let frame = ctx.frame(&ack.encode(CMD_TYPE_RES, CMD_DEP_RES))?;
        ctx.pni = ctx.pni.next();
        self.ack_pending = false;
        Ok(Step::SendOnly {
            frame,
            then: AfterSend::Listen,
        })
    }

    fn clear_flags(&mut self) {
        self.response_due = false;
        self.awaiting_data = false;
        self.awaiting_ack = false;
        self.ack_pending = false;
        self.tx_chain_open = false;
    }

    fn reset_to_idle(&mut self) {
        self.ctx = None;
        self.clear_flags();
        self.set_state(TargetState::Idle);
    }

    fn set_state(&mut self, next: TargetState) {
        if self.state != next {
            debug!("target: {} -> {}", self.state, next);
            self.state = next;
        }
    }

    fn invalid_state(&self, operation: &'static str) -> Error {
        Error::InvalidState {
            operation,
            state: self.state.to_string(),
        }
    }
}
