//! `XrProgram`: owns every runtime handle and sequences the session.

use tracing::{debug, error, info, warn};

use crate::capabilities;
use crate::events::RuntimeEvent;
use crate::frame::{self, FrameReport};
use crate::input::{self, InputState};
use crate::options::{Options, ReferenceSpaceKind, SystemSelection};
use crate::plugin::{GraphicsPlugin, PlatformPlugin};
use crate::runtime::{ProjectionLayer, ProjectionLayerView, XrRuntime};
use crate::session_state::{SessionCommand, SessionLifecycle, SessionState};
use crate::swapchain::SwapchainSet;
use crate::types::{ApplicationInfo, SystemId};
use crate::{XrError, XrResult};

/// Signals returned from [`XrProgram::poll_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollOutcome {
    pub exit_render_loop: bool,
    pub request_restart: bool,
}

pub struct XrProgram<R, G, P>
where
    R: XrRuntime,
    G: GraphicsPlugin<R>,
    P: PlatformPlugin,
{
    // Field order is teardown order.
    input: Option<InputState<R>>,
    swapchains: SwapchainSet<R, G>,
    visualized_spaces: Vec<(ReferenceSpaceKind, R::Space)>,
    app_space: Option<R::Space>,
    session: Option<R::Session>,
    system: Option<SystemId>,
    instance: Option<R::Instance>,
    graphics: G,
    platform: P,
    runtime: R,
    options: Options,
    selection: Option<SystemSelection>,
    lifecycle: SessionLifecycle,
}

fn missing(what: &str, step: &str) -> XrError {
    XrError::protocol(format!("{step} requires {what}"))
}

impl<R, G, P> XrProgram<R, G, P>
where
    R: XrRuntime,
    G: GraphicsPlugin<R>,
    P: PlatformPlugin,
{
    pub fn new(runtime: R, options: Options, platform: P, graphics: G) -> Self {
        Self {
            input: None,
            swapchains: SwapchainSet::new(),
            visualized_spaces: Vec::new(),
            app_space: None,
            session: None,
            system: None,
            instance: None,
            graphics,
            platform,
            runtime,
            options,
            selection: None,
            lifecycle: SessionLifecycle::new(),
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn graphics(&self) -> &G {
        &self.graphics
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn system_id(&self) -> Option<SystemId> {
        self.system
    }

    pub fn swapchains(&self) -> &SwapchainSet<R, G> {
        &self.swapchains
    }

    /// Kinds of the visualized spaces that were created, in creation order.
    pub fn visualized_spaces(&self) -> Vec<ReferenceSpaceKind> {
        self.visualized_spaces.iter().map(|(kind, _)| *kind).collect()
    }

    pub fn input(&self) -> Option<&InputState<R>> {
        self.input.as_ref()
    }

    pub fn session_state(&self) -> SessionState {
        self.lifecycle.state()
    }

    pub fn is_session_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    pub fn is_session_focused(&self) -> bool {
        self.lifecycle.is_focused()
    }

    pub fn create_instance(&mut self) -> XrResult<()> {
        if self.instance.is_some() {
            return Err(XrError::protocol("instance already created"));
        }

        capabilities::log_layers_and_extensions(&self.runtime);

        let mut extensions = self.platform.instance_extensions();
        for ext in self.graphics.instance_extensions() {
            if !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }
        info!(
            "creating instance for {} + {} with extensions {:?}",
            self.platform.name(),
            self.graphics.name(),
            extensions
        );

        let app_info = ApplicationInfo {
            application_name: self.options.application_name.clone(),
            application_version: 1,
            engine_name: "halo".to_string(),
            engine_version: 1,
        };
        let instance = self.runtime.create_instance(&app_info, &extensions)?;
        capabilities::log_instance_info(&self.runtime, &instance)?;
        self.instance = Some(instance);
        Ok(())
    }

    pub fn initialize_system(&mut self) -> XrResult<()> {
        let selection = self.options.system_selection()?;
        let instance = self
            .instance
            .as_ref()
            .ok_or_else(|| missing("an instance", "initialize_system"))?;
        if self.system.is_some() {
            return Err(XrError::protocol("system already initialized"));
        }

        let system = self.runtime.system(instance, selection.form_factor)?;
        info!(
            "Using system {:?} for form factor {}",
            system, selection.form_factor
        );

        let configurations = capabilities::view_configurations(&self.runtime, instance, system)?;
        capabilities::log_view_configurations(&configurations, selection.view_configuration);
        capabilities::validate_blend_mode(
            &configurations,
            selection.view_configuration,
            selection.blend_mode,
        )?;

        self.graphics
            .initialize_device(&self.runtime, instance, system)?;

        self.system = Some(system);
        self.selection = Some(selection);
        Ok(())
    }

    pub fn initialize_session(&mut self) -> XrResult<()> {
        let app_space_kind = self.options.app_space()?;
        let instance = self
            .instance
            .as_ref()
            .ok_or_else(|| missing("an instance", "initialize_session"))?;
        let system = self
            .system
            .ok_or_else(|| missing("a system", "initialize_session"))?;
        if self.session.is_some() {
            return Err(XrError::protocol("session already created"));
        }

        info!("Creating session...");
        let binding = self.graphics.graphics_binding()?;
        let session = self.runtime.create_session(instance, system, &binding)?;
        drop(binding);

        capabilities::log_reference_spaces(&self.runtime, &session);

        let input = InputState::new(
            &self.runtime,
            instance,
            &session,
            &input::default_interaction_profiles(),
        )?;

        let mut visualized = Vec::with_capacity(ReferenceSpaceKind::VISUALIZED.len());
        for kind in ReferenceSpaceKind::VISUALIZED {
            match self.runtime.create_reference_space(
                &session,
                kind.space_type(),
                kind.pose_in_reference_space(),
            ) {
                Ok(space) => visualized.push((kind, space)),
                Err(err) => warn!("Failed to create reference space {kind}: {err}"),
            }
        }

        let app_space = self.runtime.create_reference_space(
            &session,
            app_space_kind.space_type(),
            app_space_kind.pose_in_reference_space(),
        )?;

        self.input = Some(input);
        self.visualized_spaces = visualized;
        self.app_space = Some(app_space);
        self.session = Some(session);
        Ok(())
    }

    pub fn create_swapchains(&mut self) -> XrResult<()> {
        let instance = self
            .instance
            .as_ref()
            .ok_or_else(|| missing("an instance", "create_swapchains"))?;
        let system = self
            .system
            .ok_or_else(|| missing("a system", "create_swapchains"))?;
        let selection = self
            .selection
            .ok_or_else(|| missing("a system", "create_swapchains"))?;
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| missing("a session", "create_swapchains"))?;

        self.swapchains.create(
            &self.runtime,
            &mut self.graphics,
            instance,
            system,
            session,
            selection.view_configuration,
        )
    }

    /// Drain the runtime event queue.
    pub fn poll_events(&mut self) -> XrResult<PollOutcome> {
        let mut outcome = PollOutcome::default();
        let instance = self
            .instance
            .as_ref()
            .ok_or_else(|| missing("an instance", "poll_events"))?;

        while let Some(event) = self.runtime.poll_event(instance)? {
            match event {
                RuntimeEvent::EventsLost { lost_event_count } => {
                    warn!("{lost_event_count} events lost");
                }
                RuntimeEvent::InstanceLossPending { loss_time } => {
                    warn!("XrEventDataInstanceLossPending by {loss_time}");
                    return Ok(PollOutcome {
                        exit_render_loop: true,
                        request_restart: true,
                    });
                }
                RuntimeEvent::SessionStateChanged {
                    session: event_session,
                    state,
                    time,
                } => {
                    let owned = self
                        .session
                        .as_ref()
                        .map(|s| self.runtime.session_handle(s));
                    if !event_session.is_null() && owned != Some(event_session) {
                        error!("XrEventDataSessionStateChanged for unknown session {event_session}");
                        continue;
                    }

                    let old = self.lifecycle.state();
                    info!(
                        "XrEventDataSessionStateChanged: state {old}->{state} session={event_session} time={time}"
                    );
                    // Committed only once the begin/end call succeeded.
                    let mut next = self.lifecycle;
                    let transition = next.on_state_changed(state);
                    if let Some(command) = transition.command {
                        let session = self
                            .session
                            .as_ref()
                            .ok_or_else(|| missing("a session", "session state change"))?;
                        match command {
                            SessionCommand::Begin => {
                                let selection = self
                                    .selection
                                    .ok_or_else(|| missing("a system", "xrBeginSession"))?;
                                self.runtime
                                    .begin_session(session, selection.view_configuration)?;
                            }
                            SessionCommand::End => self.runtime.end_session(session)?,
                        }
                    }
                    self.lifecycle = next;
                    outcome.exit_render_loop |= transition.exit_render_loop;
                    outcome.request_restart |= transition.request_restart;
                }
                RuntimeEvent::InteractionProfileChanged { .. } => {
                    if let (Some(input), Some(session)) = (&self.input, &self.session) {
                        input.log_bound_sources(&self.runtime, session);
                    }
                }
                RuntimeEvent::ReferenceSpaceChangePending {
                    reference_space_type,
                    ..
                } => {
                    debug!("Reference space {reference_space_type} change pending");
                }
                RuntimeEvent::Other { structure_type } => {
                    debug!("Ignoring event type {structure_type}");
                }
            }
        }

        Ok(outcome)
    }

    pub fn poll_actions(&mut self) -> XrResult<input::ActionPoll> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| missing("a session", "poll_actions"))?;
        let input = self
            .input
            .as_mut()
            .ok_or_else(|| missing("input actions", "poll_actions"))?;
        input.poll(&self.runtime, session)
    }

    /// Run one wait/begin/end frame cycle.
    pub fn render_frame(&mut self) -> XrResult<FrameReport> {
        let selection = self
            .selection
            .ok_or_else(|| missing("a system", "render_frame"))?;
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| missing("a session", "render_frame"))?;
        let app_space = self
            .app_space
            .as_ref()
            .ok_or_else(|| missing("an app space", "render_frame"))?;
        if self.swapchains.is_empty() {
            return Err(missing("swapchains", "render_frame"));
        }
        let runtime = &self.runtime;

        let frame_state = runtime.wait_frame(session)?;
        runtime.begin_frame(session)?;

        let mut report = FrameReport {
            should_render: frame_state.should_render,
            ..FrameReport::default()
        };
        let mut pending = None;
        let mut projection_views = None;

        if frame_state.should_render {
            match runtime.locate_views(
                session,
                selection.view_configuration,
                frame_state.predicted_display_time,
                app_space,
            ) {
                Err(err) => pending = Some(err),
                Ok((flags, _)) if !flags.is_pose_valid() => {
                    debug!("no valid view tracking, submitting an empty frame");
                }
                Ok((_, views)) => {
                    report.views_located = views.len();
                    let swapchain_count = self.swapchains.len();
                    let config_count = self.swapchains.config_views().len();
                    if views.len() != swapchain_count || views.len() != config_count {
                        pending = Some(XrError::protocol(format!(
                            "located {} views for {} swapchains and {} configuration views",
                            views.len(),
                            swapchain_count,
                            config_count
                        )));
                    } else {
                        let cubes = frame::collect_cubes(
                            runtime,
                            app_space,
                            &self.visualized_spaces,
                            self.input.as_ref(),
                            frame_state.predicted_display_time,
                        );
                        report.cubes = cubes.len();
                        let pass = frame::render_views(
                            runtime,
                            &mut self.graphics,
                            &mut self.swapchains,
                            &views,
                            &cubes,
                        );
                        report.views_rendered = pass.views_rendered;
                        pending = pass.error;
                        projection_views = pass.projection_views;
                    }
                }
            }
        }

        let layer = projection_views.map(|views| ProjectionLayer {
            space: app_space,
            views: views
                .iter()
                .zip(self.swapchains.entries())
                .map(|(view, entry)| ProjectionLayerView {
                    pose: view.pose,
                    fov: view.fov,
                    swapchain: &entry.handle,
                    image_rect: view.image_rect,
                })
                .collect(),
        });
        report.layer_count = usize::from(layer.is_some());

        let end = runtime.end_frame(
            session,
            frame_state.predicted_display_time,
            selection.blend_mode,
            layer.as_ref(),
        );
        frame::finish_frame(report, pending, end)
    }
}
