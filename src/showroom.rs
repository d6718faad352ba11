//! Showroom session.
//!
//! Loads the room, its environment and the swatch catalog in one startup join,
//! then routes sidebar intents that need a texture load. Pointer and resize
//! input goes straight to the [`InteractionController`].

use std::collections::HashMap;

use crate::{
    camera::Viewport,
    config::{AssetManifest, ShowroomConfig, Swatch},
    controller::{ApplyOutcome, InteractionController},
    data_structures::{
        surface::SurfaceId,
        texture::{TextureHandle, TextureRef},
    },
    errors::{Result, ShowroomError},
    resources::{
        AssetSource,
        loading::{LoadBarrier, LoadProgress, LoadTicket, Metered},
        mesh, texture,
    },
    scene::{Scene, TeardownReport},
    timing::Clock,
    ui::{UiIntent, UiSink},
};

fn settle<T>(ticket: LoadTicket, result: &anyhow::Result<T>, bytes: usize) {
    match result {
        Ok(_) => ticket.complete(bytes),
        Err(err) => ticket.fail(&format!("{:#}", err)),
    }
}

pub struct Showroom<A: AssetSource, U: UiSink, C: Clock> {
    controller: InteractionController<Scene, U, C>,
    assets: A,
    manifest: AssetManifest,
    textures: HashMap<TextureRef, TextureHandle>,
}

impl<A: AssetSource, U: UiSink, C: Clock> Showroom<A, U, C> {
    /// Load every startup asset and build the session.
    ///
    /// Resolves once all loads have reported. Failures are shown through `ui`
    /// and never abort startup: a missing model leaves an empty room, a missing
    /// environment leaves the room without background, a missing swatch is
    /// retried when the user picks it.
    pub async fn load<F: FnMut(LoadProgress)>(
        config: &ShowroomConfig,
        manifest: AssetManifest,
        assets: A,
        mut ui: U,
        clock: C,
        viewport: Viewport,
        on_progress: F,
    ) -> Self {
        let mut barrier = LoadBarrier::new();
        let model_ticket = barrier.register(&manifest.model);
        let environment_ticket = manifest
            .environment
            .as_deref()
            .map(|path| (path, barrier.register(path)));
        let mut swatch_tickets: Vec<(TextureRef, LoadTicket)> = Vec::new();
        if config.preload_textures {
            for swatch in &manifest.swatches {
                if swatch_tickets.iter().all(|(texture, _)| *texture != swatch.texture) {
                    let ticket = barrier.register(swatch.texture.path());
                    swatch_tickets.push((swatch.texture.clone(), ticket));
                }
            }
        }
        log::info!("Loading {} startup assets", barrier.total());

        let source = &assets;
        let model_path = manifest.model.as_str();
        let classifier = &config.classifier;
        let model = async move {
            let metered = Metered::new(source);
            let result = mesh::load_model(&metered, model_path, classifier).await;
            settle(model_ticket, &result, metered.bytes());
            result
        };
        let environment = async move {
            let (path, ticket) = environment_ticket?;
            let metered = Metered::new(source);
            let result = texture::load_environment(&metered, path).await;
            settle(ticket, &result, metered.bytes());
            Some((path, result))
        };
        let swatches = futures::future::join_all(swatch_tickets.into_iter().map(
            |(texture_ref, ticket)| async move {
                let metered = Metered::new(source);
                let result = texture::load_texture(&metered, &texture_ref).await;
                settle(ticket, &result, metered.bytes());
                (texture_ref, result)
            },
        ));

        let (model, environment, swatches, _) =
            futures::join!(model, environment, swatches, barrier.wait(on_progress));

        let mut scene = match model {
            Ok(root) => Scene::new(root),
            Err(err) => {
                let err = ShowroomError::asset(&manifest.model, &err);
                log::error!("{}", err);
                ui.notice(&err);
                Scene::empty()
            }
        };
        match environment {
            Some((_, Ok(handle))) => scene.set_environment(Some(handle)),
            Some((path, Err(err))) => {
                let err = ShowroomError::asset(path, &err);
                log::error!("{}", err);
                ui.notice(&err);
            }
            None => {}
        }
        let mut textures = HashMap::new();
        for (texture_ref, result) in swatches {
            match result {
                Ok(handle) => {
                    textures.insert(texture_ref, handle);
                }
                Err(err) => {
                    let err = ShowroomError::texture(texture_ref.path(), &err);
                    log::error!("{}", err);
                    ui.notice(&err);
                }
            }
        }

        Self {
            controller: InteractionController::new(config, scene, ui, clock, viewport),
            assets,
            manifest,
            textures,
        }
    }

    pub fn controller(&self) -> &InteractionController<Scene, U, C> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut InteractionController<Scene, U, C> {
        &mut self.controller
    }

    pub fn scene(&self) -> &Scene {
        self.controller.scene()
    }

    pub fn ui(&self) -> &U {
        self.controller.ui()
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    /// A catalog texture, if it is already loaded.
    pub fn texture(&self, texture: &TextureRef) -> Option<&TextureHandle> {
        self.textures.get(texture)
    }

    /// Per-frame housekeeping. Returns the surfaces the renderer has to re-upload.
    pub fn frame(&mut self) -> Vec<SurfaceId> {
        self.controller.tick();
        self.controller.scene_mut().take_dirty()
    }

    /// Apply a catalog swatch to the current selection, loading it first if needed.
    ///
    /// A failed load leaves selection and materials untouched.
    pub async fn choose_texture(&mut self, swatch_id: &str) -> Result<ApplyOutcome> {
        let Some(swatch) = self.manifest.swatch(swatch_id).cloned() else {
            let err = ShowroomError::UnknownSwatch(swatch_id.to_string());
            self.controller.report(err.clone());
            return Err(err);
        };
        if let Err(reason) = self.controller.target_for(&swatch) {
            return Ok(self.controller.ignore(reason));
        }
        let handle = self.fetch_texture(&swatch).await?;
        self.controller.texture_chosen(&swatch, handle)
    }

    async fn fetch_texture(&mut self, swatch: &Swatch) -> Result<TextureHandle> {
        if let Some(handle) = self.textures.get(&swatch.texture) {
            return Ok(handle.clone());
        }
        match texture::load_texture(&self.assets, &swatch.texture).await {
            Ok(handle) => {
                self.textures.insert(swatch.texture.clone(), handle.clone());
                Ok(handle)
            }
            Err(err) => {
                let err = ShowroomError::texture(swatch.texture.path(), &err);
                self.controller.report(err.clone());
                Err(err)
            }
        }
    }

    /// Handle any sidebar intent.
    pub async fn dispatch(&mut self, intent: UiIntent) -> Result<Option<ApplyOutcome>> {
        match intent {
            UiIntent::TextureChosen(swatch_id) => self.choose_texture(&swatch_id).await.map(Some),
            intent => self.controller.handle_intent(intent),
        }
    }

    /// End the session and release everything the room holds.
    pub fn teardown(mut self) -> TeardownReport {
        let framed = self.controller.engine_mut().drain_cache();
        let (scene, _) = self.controller.into_parts();
        log::info!("Releasing {} catalog textures", self.textures.len());
        scene.teardown_with(framed)
    }
}
