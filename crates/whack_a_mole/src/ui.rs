use bevy::prelude::*;
use whack_helpers::FONT;
use whack_helpers::restart::RestartButton;

use crate::gameplay::{GameState, GameplaySet, RoundEnded};
use crate::session::Session;

#[derive(Resource, Default)]
pub struct ScoreUI {
    score: u32,
    digit: usize,
    visibility: Visibility,
    is_dirty: bool,
}

impl ScoreUI {
    pub fn update(&mut self, new_score: u32) {
        self.score = new_score;
        self.is_dirty = true;
    }

    pub fn set_visiblity(&mut self, new_visiblity: Visibility) {
        self.visibility = new_visiblity;
        self.is_dirty = true;
    }

    pub fn set_digit(&mut self, new_digit: usize) {
        self.digit = new_digit;
        self.is_dirty = true;
    }

    pub fn text(&self) -> String {
        format!("SCORE {:0digit$}", self.score, digit = self.digit)
    }
}

/// Remaining whole seconds of the round.
#[derive(Resource, Default)]
pub struct TimeUI {
    seconds: u32,
    visibility: Visibility,
    is_dirty: bool,
}

impl TimeUI {
    pub fn update(&mut self, new_seconds: u32) {
        self.seconds = new_seconds;
        self.is_dirty = true;
    }

    pub fn set_visiblity(&mut self, new_visibility: Visibility) {
        self.visibility = new_visibility;
        self.is_dirty = true;
    }

    pub fn text(&self) -> String {
        format!("TIME {:02}", self.seconds)
    }
}

/// End of round panel with the final score and the restart button.
#[derive(Resource, Default)]
pub struct GameOverUI {
    final_score: Option<u32>,
    is_dirty: bool,
}

impl GameOverUI {
    pub fn show(&mut self, final_score: u32) {
        self.final_score = Some(final_score);
        self.is_dirty = true;
    }

    pub fn hide(&mut self) {
        self.final_score = None;
        self.is_dirty = true;
    }

    pub const fn is_shown(&self) -> bool {
        self.final_score.is_some()
    }

    pub fn text(&self) -> String {
        self.final_score
            .map_or_else(String::new, |score| format!("GAME OVER\nFinal score {score}"))
    }
}

#[derive(Component)]
struct ScoreText;

#[derive(Component)]
struct TimeText;

#[derive(Component)]
struct GameOverPanel;

#[derive(Component)]
struct GameOverText;

pub struct UIPlugin;

impl Plugin for UIPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScoreUI>()
            .init_resource::<TimeUI>()
            .init_resource::<GameOverUI>()
            .add_systems(Startup, setup)
            .add_systems(OnEnter(GameState::Playing), show_hud)
            .add_systems(
                Update,
                (
                    (mirror_session, show_game_over).in_set(GameplaySet::Feedback),
                    (update_score, update_time, update_game_over).after(GameplaySet::Feedback),
                ),
            );
    }
}

fn setup(mut commands: Commands, asset_server: Res<AssetServer>) {
    let font = TextFont {
        font: asset_server.load(FONT),
        font_size: 32.0,
        ..default()
    };

    commands
        .spawn(Node {
            width: Val::Percent(100.),
            height: Val::Percent(100.),
            display: Display::Grid,
            grid_template_rows: RepeatedGridTrack::fr(3, 1.),
            ..default()
        })
        .with_children(|parent| {
            parent
                .spawn(Node {
                    display: Display::Grid,
                    grid_template_columns: RepeatedGridTrack::fr(2, 1.),
                    padding: UiRect::all(Val::Px(12.)),
                    ..default()
                })
                .with_children(|parent| {
                    parent.spawn((
                        Node {
                            align_self: AlignSelf::Start,
                            justify_self: JustifySelf::Start,
                            ..default()
                        },
                        Text::new(""),
                        font.clone(),
                        Visibility::Hidden,
                        ScoreText,
                    ));
                    parent.spawn((
                        Node {
                            align_self: AlignSelf::Start,
                            justify_self: JustifySelf::End,
                            ..default()
                        },
                        Text::new(""),
                        font.clone(),
                        Visibility::Hidden,
                        TimeText,
                    ));
                });
            parent
                .spawn((
                    Node {
                        align_self: AlignSelf::Center,
                        justify_self: JustifySelf::Center,
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        row_gap: Val::Px(16.),
                        padding: UiRect::all(Val::Px(24.)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.25, 0.25, 0.25, 0.75)),
                    Visibility::Hidden,
                    GameOverPanel,
                ))
                .with_children(|parent| {
                    parent.spawn((
                        Text::new(""),
                        font.clone(),
                        TextColor(Color::srgb(1., 0., 0.)),
                        TextLayout::new_with_justify(JustifyText::Center),
                        GameOverText,
                    ));
                    parent
                        .spawn((
                            Button,
                            Node {
                                padding: UiRect::axes(Val::Px(20.), Val::Px(10.)),
                                ..default()
                            },
                            BackgroundColor(Color::srgb(0.15, 0.15, 0.15)),
                            RestartButton,
                        ))
                        .with_children(|parent| {
                            parent.spawn((Text::new("Restart"), font.clone()));
                        });
                });
        });
}

fn show_hud(
    mut score_ui: ResMut<ScoreUI>,
    mut time_ui: ResMut<TimeUI>,
    mut game_over_ui: ResMut<GameOverUI>,
) {
    score_ui.set_digit(4);
    score_ui.set_visiblity(Visibility::Inherited);
    time_ui.set_visiblity(Visibility::Inherited);
    if game_over_ui.is_shown() {
        game_over_ui.hide();
    }
}

fn mirror_session(
    session: Res<Session>,
    mut score_ui: ResMut<ScoreUI>,
    mut time_ui: ResMut<TimeUI>,
) {
    if session.is_changed() {
        score_ui.update(session.score());
        time_ui.update(session.remaining_seconds());
    }
}

fn show_game_over(mut round_ended: EventReader<RoundEnded>, mut game_over_ui: ResMut<GameOverUI>) {
    for ended in round_ended.read() {
        game_over_ui.show(ended.final_score);
    }
}

fn update_score(
    mut score: ResMut<ScoreUI>,
    mut query: Query<(&mut Text, &mut Visibility), With<ScoreText>>,
) {
    if score.is_dirty {
        for (mut text, mut visibility) in &mut query {
            *text = Text::new(score.text());
            *visibility = score.visibility;
        }
        score.is_dirty = false;
    }
}

fn update_time(
    mut time: ResMut<TimeUI>,
    mut query: Query<(&mut Text, &mut Visibility), With<TimeText>>,
) {
    if time.is_dirty {
        for (mut text, mut visibility) in &mut query {
            *text = Text::new(time.text());
            *visibility = time.visibility;
        }
        time.is_dirty = false;
    }
}

fn update_game_over(
    mut game_over: ResMut<GameOverUI>,
    mut panels: Query<&mut Visibility, With<GameOverPanel>>,
    mut texts: Query<&mut Text, With<GameOverText>>,
) {
    if game_over.is_dirty {
        let visibility = if game_over.is_shown() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        for mut panel_visibility in &mut panels {
            *panel_visibility = visibility;
        }
        for mut text in &mut texts {
            *text = Text::new(game_over.text());
        }
        game_over.is_dirty = false;
    }
}
