//! Request handlers. Each one hands its node call to the blocking pool under
//! an `rpc` span.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use verdict_electorate::{Credential, VoterInvite};
use verdict_node::tracing_spans::rpc_span;
use verdict_node::{NewEntry, NewEvent, NewPoll, NodeError, VerdictNode};
use verdict_participation::ParticipationSummary;
use verdict_tally::{BallotRequest, SubmitOutcome};
use verdict_tiebreak::TieBreakRequest;
use verdict_types::{
    BallotChoice, CommitmentId, DeliveryStatus, EntryId, EventId, EventStatus, MemberRef,
    ParticipationRecord, PollId, Timestamp,
};

use crate::error::{RpcError, RpcResult};
use crate::pagination::{paginate, Page, PaginationParams};

pub type AppState = Arc<VerdictNode>;

async fn run<T, F>(node: &AppState, action: &'static str, f: F) -> RpcResult<T>
where
    T: Send + 'static,
    F: FnOnce(&VerdictNode) -> Result<T, NodeError> + Send + 'static,
{
    let node = Arc::clone(node);
    let result = tokio::task::spawn_blocking(move || {
        let _span = rpc_span(action).entered();
        f(&node)
    })
    .await
    .map_err(|e| RpcError::Server(e.to_string()))?;
    Ok(result?)
}

// ── Health & metrics ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub now: Timestamp,
}

pub async fn health(State(node): State<AppState>) -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        now: node.now(),
    })
}

pub async fn metrics(State(node): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        node.metrics().encode(),
    )
        .into_response()
}

// ── Events ───────────────────────────────────────────────────────────────

pub async fn create_event(State(node): State<AppState>, Json(req): Json<NewEvent>) -> RpcResult<Response> {
    let event = run(&node, "create_event", move |n| n.create_event(req)).await?;
    Ok((StatusCode::CREATED, Json(event)).into_response())
}

pub async fn list_events(
    State(node): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> RpcResult<Json<Page<verdict_types::Event>>> {
    let events = run(&node, "list_events", |n| n.list_events()).await?;
    Ok(Json(paginate(events, &page)))
}

pub async fn get_event(State(node): State<AppState>, Path(id): Path<String>) -> RpcResult<Response> {
    let event = run(&node, "get_event", move |n| n.get_event(&EventId::new(id))).await?;
    Ok(Json(event).into_response())
}

#[derive(Deserialize)]
pub struct TransitionBody {
    pub status: EventStatus,
}

pub async fn transition_status(
    State(node): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<TransitionBody>,
) -> RpcResult<Response> {
    let applied = run(&node, "transition_status", move |n| {
        n.transition_status(&EventId::new(id), body.status)
    })
    .await?;
    Ok(Json(applied).into_response())
}

pub async fn reconcile_event(State(node): State<AppState>, Path(id): Path<String>) -> RpcResult<Response> {
    let report = run(&node, "reconcile", move |n| n.reconcile_statuses(Some(&EventId::new(id)))).await?;
    Ok(Json(report).into_response())
}

pub async fn reconcile_all(State(node): State<AppState>) -> RpcResult<Response> {
    let report = run(&node, "reconcile", |n| n.reconcile_statuses(None)).await?;
    Ok(Json(report).into_response())
}

#[derive(Deserialize, Default)]
pub struct VoterPhaseBody {
    #[serde(default)]
    pub at: Option<Timestamp>,
}

pub async fn complete_voter_phase(
    State(node): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<VoterPhaseBody>>,
) -> RpcResult<Response> {
    let at = body.and_then(|Json(b)| b.at);
    let event = run(&node, "complete_voter_phase", move |n| {
        n.complete_voter_phase(&EventId::new(id), at)
    })
    .await?;
    Ok(Json(event).into_response())
}

pub async fn event_polls(State(node): State<AppState>, Path(id): Path<String>) -> RpcResult<Response> {
    let polls = run(&node, "polls_for_event", move |n| n.polls_for_event(&EventId::new(id))).await?;
    Ok(Json(polls).into_response())
}

// ── Polls & entries ──────────────────────────────────────────────────────

pub async fn create_poll(State(node): State<AppState>, Json(req): Json<NewPoll>) -> RpcResult<Response> {
    let poll = run(&node, "create_poll", move |n| n.create_poll(req)).await?;
    Ok((StatusCode::CREATED, Json(poll)).into_response())
}

pub async fn get_poll(State(node): State<AppState>, Path(id): Path<String>) -> RpcResult<Response> {
    let poll = run(&node, "get_poll", move |n| n.get_poll(&PollId::new(id))).await?;
    Ok(Json(poll).into_response())
}

#[derive(Deserialize)]
pub struct EntryBody {
    pub display_name: String,
    #[serde(default)]
    pub metadata: std::collections::BTreeMap<String, String>,
    #[serde(default)]
    pub owner_identity: Option<String>,
}

pub async fn add_entry(
    State(node): State<AppState>,
    Path(poll): Path<String>,
    Json(body): Json<EntryBody>,
) -> RpcResult<Response> {
    let request = NewEntry {
        poll_id: PollId::new(poll),
        display_name: body.display_name,
        metadata: body.metadata,
        owner_identity: body.owner_identity,
    };
    let entry = run(&node, "add_entry", move |n| n.add_entry(request)).await?;
    Ok((StatusCode::CREATED, Json(entry)).into_response())
}

pub async fn poll_entries(State(node): State<AppState>, Path(poll): Path<String>) -> RpcResult<Response> {
    let entries = run(&node, "entries_for_poll", move |n| n.entries_for_poll(&PollId::new(poll))).await?;
    Ok(Json(entries).into_response())
}

#[derive(Deserialize)]
pub struct DuplicateBody {
    pub target_poll: PollId,
}

pub async fn duplicate_entry(
    State(node): State<AppState>,
    Path(entry): Path<String>,
    Json(body): Json<DuplicateBody>,
) -> RpcResult<Response> {
    let copy = run(&node, "duplicate_entry", move |n| {
        n.duplicate_entry(&EntryId::new(entry), &body.target_poll)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(copy)).into_response())
}

// ── Electorate ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct InviteBody {
    pub invites: Vec<VoterInvite>,
}

pub async fn issue_voter_tokens(
    State(node): State<AppState>,
    Path(poll): Path<String>,
    Json(body): Json<InviteBody>,
) -> RpcResult<Response> {
    if body.invites.is_empty() {
        return Err(RpcError::InvalidRequest("no invites given".into()));
    }
    let tokens = run(&node, "issue_voter_tokens", move |n| {
        n.issue_voter_tokens(&PollId::new(poll), &body.invites)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(tokens)).into_response())
}

pub async fn voter_tokens(State(node): State<AppState>, Path(poll): Path<String>) -> RpcResult<Response> {
    let tokens = run(&node, "voter_tokens", move |n| n.voter_tokens(&PollId::new(poll))).await?;
    Ok(Json(tokens).into_response())
}

#[derive(Deserialize)]
pub struct JudgeBody {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

pub async fn add_judge(
    State(node): State<AppState>,
    Path(poll): Path<String>,
    Json(body): Json<JudgeBody>,
) -> RpcResult<Response> {
    let judge = run(&node, "add_judge", move |n| {
        n.add_judge(&PollId::new(poll), &body.email, body.name)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(judge)).into_response())
}

pub async fn judges(State(node): State<AppState>, Path(poll): Path<String>) -> RpcResult<Response> {
    let judges = run(&node, "judges", move |n| n.judges(&PollId::new(poll))).await?;
    Ok(Json(judges).into_response())
}

#[derive(Deserialize)]
pub struct RevokeBody {
    pub member: MemberRef,
    #[serde(default = "revoke_default")]
    pub revoked: bool,
}

fn revoke_default() -> bool {
    true
}

pub async fn revoke_member(
    State(node): State<AppState>,
    Path(poll): Path<String>,
    Json(body): Json<RevokeBody>,
) -> RpcResult<StatusCode> {
    run(&node, "revoke_member", move |n| {
        n.revoke_member(&PollId::new(poll), &body.member, body.revoked)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct DeliveryBody {
    pub member: MemberRef,
    pub status: DeliveryStatus,
}

pub async fn update_delivery_status(
    State(node): State<AppState>,
    Path(poll): Path<String>,
    Json(body): Json<DeliveryBody>,
) -> RpcResult<StatusCode> {
    run(&node, "update_delivery_status", move |n| {
        n.update_delivery_status(&PollId::new(poll), &body.member, body.status)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn turnout(State(node): State<AppState>, Path(poll): Path<String>) -> RpcResult<Response> {
    let turnout = run(&node, "turnout", move |n| n.turnout(&PollId::new(poll))).await?;
    Ok(Json(turnout).into_response())
}

// ── Ballots & results ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct BallotBody {
    pub credential: Credential,
    pub choice: BallotChoice,
}

/// `201` for a stored ballot, `200` when the member already voted and `422`
/// for a rejection. The body is the outcome in every case.
pub async fn submit_ballot(
    State(node): State<AppState>,
    Path(poll): Path<String>,
    Json(body): Json<BallotBody>,
) -> RpcResult<Response> {
    let request = BallotRequest {
        poll_id: PollId::new(poll),
        credential: body.credential,
        choice: body.choice,
    };
    let outcome = run(&node, "submit_ballot", move |n| n.submit_ballot(&request)).await?;
    let status = match &outcome {
        SubmitOutcome::Accepted { .. } => StatusCode::CREATED,
        SubmitOutcome::AlreadyVoted { .. } => StatusCode::OK,
        SubmitOutcome::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    Ok((status, Json(outcome)).into_response())
}

/// Organizer view; always available.
/// Receipt lookup: `GET /polls/:id/ballots/:role/:member`.
pub async fn get_ballot(
    State(node): State<AppState>,
    Path((poll, role, member)): Path<(String, String, String)>,
) -> RpcResult<Response> {
    let member = match role.as_str() {
        "voter" => MemberRef::Voter(member.into()),
        "judge" => MemberRef::Judge(member.into()),
        other => return Err(RpcError::InvalidRequest(format!("unknown role '{other}'"))),
    };
    let key = member.to_string();
    let ballot = run(&node, "get_ballot", move |n| n.get_ballot(&PollId::new(poll), &member)).await?;
    match ballot {
        Some(ballot) => Ok(Json(ballot).into_response()),
        None => Err(RpcError::NotFound(format!("ballot of {key}"))),
    }
}

pub async fn tally(State(node): State<AppState>, Path(poll): Path<String>) -> RpcResult<Response> {
    let tally = run(&node, "compute_tally", move |n| n.compute_tally(&PollId::new(poll))).await?;
    Ok(Json(tally).into_response())
}

pub async fn public_results(State(node): State<AppState>, Path(poll): Path<String>) -> RpcResult<Response> {
    let tally = run(&node, "public_results", move |n| n.public_results(&PollId::new(poll))).await?;
    Ok(Json(tally).into_response())
}

#[derive(Deserialize)]
pub struct TieQuery {
    pub cutoff: Option<u32>,
}

/// With `cutoff`, the single tie group at that position (or `null`);
/// without, every tie group.
pub async fn ties(
    State(node): State<AppState>,
    Path(poll): Path<String>,
    Query(query): Query<TieQuery>,
) -> RpcResult<Response> {
    let poll = PollId::new(poll);
    match query.cutoff {
        Some(0) => Err(RpcError::InvalidRequest("cutoff must be at least 1".into())),
        Some(cutoff) => {
            let group = run(&node, "detect_ties", move |n| n.detect_ties(&poll, cutoff)).await?;
            Ok(Json(group).into_response())
        }
        None => {
            let groups = run(&node, "all_tie_groups", move |n| n.all_tie_groups(&poll)).await?;
            Ok(Json(groups).into_response())
        }
    }
}

#[derive(Deserialize)]
pub struct TieBreakBody {
    pub entries: Vec<EntryId>,
    pub name: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    #[serde(default)]
    pub supersede: bool,
}

pub async fn create_tie_breaker(
    State(node): State<AppState>,
    Path(poll): Path<String>,
    Json(body): Json<TieBreakBody>,
) -> RpcResult<Response> {
    let request = TieBreakRequest {
        parent: PollId::new(poll),
        entries: body.entries,
        name: body.name,
        start_time: body.start_time,
        end_time: body.end_time,
        supersede: body.supersede,
    };
    let created = run(&node, "create_tie_breaker", move |n| n.create_tie_breaker(&request)).await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

// ── Integrity ────────────────────────────────────────────────────────────

pub async fn event_commitments(State(node): State<AppState>, Path(id): Path<String>) -> RpcResult<Response> {
    let rows = run(&node, "commitments_for_event", move |n| {
        n.commitments_for_event(&EventId::new(id))
    })
    .await?;
    Ok(Json(rows).into_response())
}

pub async fn commit_results(State(node): State<AppState>, Path(id): Path<String>) -> RpcResult<Response> {
    let row = run(&node, "commit_results", move |n| n.commit_results(&EventId::new(id))).await?;
    Ok((StatusCode::CREATED, Json(row)).into_response())
}

pub async fn get_commitment(State(node): State<AppState>, Path(id): Path<String>) -> RpcResult<Response> {
    let row = run(&node, "get_commitment", move |n| n.get_commitment(&CommitmentId::new(id))).await?;
    Ok(Json(row).into_response())
}

pub async fn verify_commitment(State(node): State<AppState>, Path(id): Path<String>) -> RpcResult<Response> {
    let result = run(&node, "verify", move |n| n.verify(&CommitmentId::new(id))).await?;
    Ok(Json(result).into_response())
}

pub async fn verify_event(State(node): State<AppState>, Path(id): Path<String>) -> RpcResult<Response> {
    let result = run(&node, "verify_all", move |n| n.verify_all(&EventId::new(id))).await?;
    Ok(Json(result).into_response())
}

#[derive(Deserialize)]
pub struct AnchorBody {
    pub tx_ref: String,
    #[serde(default)]
    pub block_ref: Option<u64>,
}

pub async fn anchor(
    State(node): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AnchorBody>,
) -> RpcResult<Response> {
    let row = run(&node, "anchor", move |n| {
        n.anchor(&CommitmentId::new(id), &body.tx_ref, body.block_ref)
    })
    .await?;
    Ok(Json(row).into_response())
}

// ── Participation ────────────────────────────────────────────────────────

pub async fn event_participation(
    State(node): State<AppState>,
    Path(id): Path<String>,
    Query(page): Query<PaginationParams>,
) -> RpcResult<Json<Page<ParticipationRecord>>> {
    let records = run(&node, "participation_for_event", move |n| {
        n.participation_for_event(&EventId::new(id))
    })
    .await?;
    Ok(Json(paginate(records, &page)))
}

#[derive(Serialize)]
pub struct IdentityHistory {
    pub summary: ParticipationSummary,
    pub records: Vec<ParticipationRecord>,
}

pub async fn identity_participation(
    State(node): State<AppState>,
    Path(identity): Path<String>,
) -> RpcResult<Json<IdentityHistory>> {
    let records = run(&node, "participation_for_identity", move |n| {
        n.participation_for_identity(&identity)
    })
    .await?;
    Ok(Json(IdentityHistory {
        summary: verdict_participation::summarize(&records),
        records,
    }))
}
