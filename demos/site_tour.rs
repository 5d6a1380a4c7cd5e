//! A scripted walk through a landing page.
//!
//! Shows:
//! - A provider mounted once with a pinned performance mode
//! - A staggered feature list revealed when it scrolls into view
//! - A hover card driven by pointer events
//! - A parallax hero following the scroll position
//! - Live-region announcements
//!
//! Time is virtual: the script advances the scheduler instead of sleeping.
//! Run with `RUST_LOG=debug` to see the motion layer's own logging.

use atelier_motion::prelude::*;
use atelier_motion::scheduler;

fn main() {
    env_logger::init();

    let platform = Platform::default();
    let hero = ElementRef::new();
    hero.attach(Rect::new(0.0, 0.0, 1280.0, 600.0));

    let ((context, features, card, parallax), scope) = with_scope(|| {
        let context = MotionProvider::new(&platform)
            .config(MotionConfig::default().performance_mode(Some(PerformanceMode::High)))
            .mount();
        context.announcer().announce_page_change("Home");

        let features = use_stagger_animation(
            4,
            StaggerOptions::new()
                .stagger_ms(80.0)
                .on_item_start(|index| println!("  feature {index} starts"))
                .on_complete(|| println!("  feature list settled")),
        );
        let card = use_motion(MotionOptions::preset("hoverLift"));
        let parallax = use_parallax(&hero, ParallaxOptions::offset(120.0));
        (context, features, card, parallax)
    });

    // The feature list sits below the fold.
    features
        .container_ref()
        .attach(Rect::new(0.0, 1400.0, 1280.0, 400.0));

    println!("scrolling to the hero's midpoint");
    platform.scroll_to(0.0, 300.0);
    scheduler::advance_by(16.0);
    println!(
        "  hero offset {:.1}px at progress {:.2}",
        parallax.style().get().y,
        parallax.progress().get()
    );

    println!("scrolling the feature list into view");
    platform.scroll_to(0.0, 1000.0);
    scheduler::advance_by(1000.0);

    println!("hovering the pricing card");
    let handlers = card.event_handlers();
    handlers.dispatch(&InteractionEvent::PointerEnter { x: 640.0, y: 420.0 });
    let props = card.animation_props();
    println!(
        "  active: {}, scale {:.2} over {:.2}s",
        card.is_active(),
        props.animate.scale,
        props.transition.duration
    );
    handlers.dispatch(&InteractionEvent::PointerLeave);

    scheduler::advance_by(200.0);
    println!(
        "live region says: {:?}",
        context.announcer().live_region(Politeness::Polite).get()
    );

    println!("switching on reduced motion");
    platform.set_reduced_motion_preference(true);
    handlers.dispatch(&InteractionEvent::PointerEnter { x: 640.0, y: 420.0 });
    println!("  card active: {}", card.is_active());

    dispose_scope(scope);
    println!("pending timers after teardown: {}", scheduler::pending_timers());
}
